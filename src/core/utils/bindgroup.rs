use std::num::NonZero;

use super::context::AnyContext;

pub struct BindGroupBuilder {
    label: Option<String>,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
}

impl BindGroupBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            entries: Vec::new(),
        }
    }

    pub fn add_uniform_buffer(
        mut self,
        visibility: wgpu::ShaderStages,
        min_binding_size: Option<NonZero<u64>>,
    ) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding: self.entries.len() as u32,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size,
            },
            count: None,
        });
        self
    }

    pub fn build(self, ctx: &impl AnyContext) -> wgpu::BindGroupLayout {
        ctx.device()
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: self.label.as_deref(),
                entries: &self.entries,
            })
    }
}

/// Binds resources to a layout, in binding order.
pub trait Attach {
    fn attach(
        &self,
        ctx: &impl AnyContext,
        label: &str,
        resources: Vec<wgpu::BindingResource<'_>>,
    ) -> wgpu::BindGroup;
}

impl Attach for wgpu::BindGroupLayout {
    fn attach(
        &self,
        ctx: &impl AnyContext,
        label: &str,
        resources: Vec<wgpu::BindingResource<'_>>,
    ) -> wgpu::BindGroup {
        let entries: Vec<_> = resources
            .into_iter()
            .enumerate()
            .map(|(i, resource)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource,
            })
            .collect();
        ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: self,
            entries: &entries,
        })
    }
}
