use wgpu::util::DeviceExt;

use super::{
    camera::Camera,
    color::Color,
    scene::Stage,
    tessellate::{Mesh, Pass, Vertex},
    utils::{
        context::AnyContext,
        pipeline::{PipelineBuilder, STENCIL_FORMAT},
    },
};
use crate::error::Result;

pub const SAMPLE_COUNT: u32 = 4;

/// Multisampled color and stencil attachments, resolved into the caller's view.
struct Targets {
    color: wgpu::TextureView,
    stencil: wgpu::TextureView,
}

impl Targets {
    fn new(
        ctx: &impl AnyContext,
        format: wgpu::TextureFormat,
        (width, height): (u32, u32),
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let create = |label, format| {
            ctx.device()
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size,
                    mip_level_count: 1,
                    sample_count: SAMPLE_COUNT,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };
        Self {
            color: create("Multisample Texture", format),
            stencil: create("Stencil Texture", STENCIL_FORMAT),
        }
    }
}

/// Draws a [`Stage`] with stencil-then-cover passes.
pub struct Renderer {
    format: wgpu::TextureFormat,
    camera: Camera,
    fill_pipeline: wgpu::RenderPipeline,
    stroke_pipeline: wgpu::RenderPipeline,
    cover_pipeline: wgpu::RenderPipeline,
    targets: Targets,
    frame: Mesh,
}

impl Renderer {
    pub fn new(
        ctx: &impl AnyContext,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Result<Self> {
        let camera = Camera::new(ctx, size)?;
        let shader = ctx
            .device()
            .create_shader_module(wgpu::include_wgsl!("shader.wgsl"));
        let vertex_layout = &[wgpu::VertexBufferLayout {
            array_stride: Vertex::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Vertex::ATTRIBUTES,
        }];

        let mask_target = [Some(wgpu::ColorTargetState {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::empty(),
        })];
        let color_target = [Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let stencil_op = |compare, pass_op| wgpu::StencilFaceState {
            compare,
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op,
        };

        // even-odd: every covering triangle flips the sample
        let fill_pipeline = PipelineBuilder::for_render("Fill Stencil Pipeline", &shader)
            .vertex(vertex_layout)
            .fragment("fs_main", &mask_target)
            .stencil(
                stencil_op(
                    wgpu::CompareFunction::Always,
                    wgpu::StencilOperation::Invert,
                ),
                0xff,
                0xff,
            )
            .multisample(SAMPLE_COUNT)
            .add_bind_group_layout(&camera.bind_group_layout)
            .build(ctx);

        // overlapping stroke pieces mark a sample once
        let stroke_pipeline = PipelineBuilder::for_render("Stroke Stencil Pipeline", &shader)
            .vertex(vertex_layout)
            .fragment("fs_main", &mask_target)
            .stencil(
                stencil_op(
                    wgpu::CompareFunction::Always,
                    wgpu::StencilOperation::Replace,
                ),
                0xff,
                0xff,
            )
            .multisample(SAMPLE_COUNT)
            .add_bind_group_layout(&camera.bind_group_layout)
            .build(ctx);

        // paints marked samples and clears them for the next shape
        let cover_pipeline = PipelineBuilder::for_render("Cover Pipeline", &shader)
            .vertex(vertex_layout)
            .fragment("fs_main", &color_target)
            .stencil(
                stencil_op(
                    wgpu::CompareFunction::NotEqual,
                    wgpu::StencilOperation::Zero,
                ),
                0xff,
                0xff,
            )
            .multisample(SAMPLE_COUNT)
            .add_bind_group_layout(&camera.bind_group_layout)
            .build(ctx);

        Ok(Self {
            format,
            camera,
            fill_pipeline,
            stroke_pipeline,
            cover_pipeline,
            targets: Targets::new(ctx, format, size),
            frame: Mesh::default(),
        })
    }

    pub fn resize(&mut self, ctx: &impl AnyContext, size: (u32, u32)) -> Result<()> {
        self.targets = Targets::new(ctx, self.format, size);
        self.camera.resize(ctx, size)
    }

    /// sRGB targets expect linear colors.
    fn convert(&self, color: Color) -> Color {
        if self.format.is_srgb() {
            color.to_linear()
        } else {
            color
        }
    }

    pub fn render(
        &mut self,
        ctx: &impl AnyContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        stage: &Stage,
        background: Color,
    ) {
        let srgb = self.format.is_srgb();
        self.frame.clear();
        for leaf in stage.draw_order() {
            let mut leaf = leaf.borrow_mut();
            self.frame.append_with(leaf.mesh(), |c| {
                if srgb {
                    c.to_linear()
                } else {
                    c
                }
            });
        }

        let vertex_buffer = (!self.frame.vertices.is_empty()).then(|| {
            ctx.device()
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Frame Vertex Buffer"),
                    contents: bytemuck::cast_slice(&self.frame.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.targets.color,
                resolve_target: Some(view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.convert(background).into()),
                    store: wgpu::StoreOp::Discard,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.stencil,
                depth_ops: None,
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Discard,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(vertex_buffer) = vertex_buffer.as_ref() else {
            return;
        };
        pass.set_bind_group(0, &self.camera.bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));

        let mut current = None;
        for command in &self.frame.commands {
            if current != Some(command.pass) {
                let (pipeline, reference) = match command.pass {
                    Pass::FillMark => (&self.fill_pipeline, 0),
                    Pass::StrokeMark => (&self.stroke_pipeline, 1),
                    Pass::Cover => (&self.cover_pipeline, 0),
                };
                pass.set_pipeline(pipeline);
                pass.set_stencil_reference(reference);
                current = Some(command.pass);
            }
            pass.draw(command.range.clone(), 0..1);
        }
    }
}
