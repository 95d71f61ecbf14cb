use cgmath::Matrix4;
use encase::ShaderType;
use wgpu::util::DeviceExt;

use super::utils::{
    bindgroup::{Attach, BindGroupBuilder},
    context::AnyContext,
};
use crate::error::Result;
use crate::geometry::{FRAME_HEIGHT, FRAME_WIDTH};

#[derive(Debug, Clone, ShaderType)]
pub struct CameraUniform {
    pub view_proj: Matrix4<f32>,
}

impl CameraUniform {
    /// Maps the scene frame onto clip space, letterboxing when the target's
    /// aspect ratio differs from the frame's.
    pub fn fit(width: u32, height: u32) -> Self {
        let frame_aspect = FRAME_WIDTH / FRAME_HEIGHT;
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let (half_w, half_h) = if aspect >= frame_aspect {
            (FRAME_HEIGHT / 2. * aspect, FRAME_HEIGHT / 2.)
        } else {
            (FRAME_WIDTH / 2., FRAME_WIDTH / 2. / aspect)
        };
        Self {
            view_proj: cgmath::ortho(-half_w, half_w, -half_h, half_h, -1., 1.),
        }
    }

    fn bytes(&self) -> Result<Vec<u8>> {
        let mut buff = encase::UniformBuffer::new(Vec::<u8>::new());
        buff.write(self)?;
        Ok(buff.into_inner())
    }
}

/// Orthographic camera over the scene frame.
pub struct Camera {
    uniform: CameraUniform,
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl Camera {
    pub fn new(ctx: &impl AnyContext, (width, height): (u32, u32)) -> Result<Self> {
        let uniform = CameraUniform::fit(width, height);
        let buffer = ctx
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: &uniform.bytes()?,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group_layout = BindGroupBuilder::new("Camera Bind Group layout")
            .add_uniform_buffer(wgpu::ShaderStages::VERTEX, Some(CameraUniform::min_size()))
            .build(ctx);

        let bind_group =
            bind_group_layout.attach(ctx, "Camera Bind Group", vec![buffer.as_entire_binding()]);

        Ok(Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        })
    }

    pub fn resize(&mut self, ctx: &impl AnyContext, (width, height): (u32, u32)) -> Result<()> {
        self.uniform = CameraUniform::fit(width, height);
        ctx.queue()
            .write_buffer(&self.buffer, 0, &self.uniform.bytes()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector4;

    use super::*;

    fn project(u: &CameraUniform, x: f32, y: f32) -> Vector4<f32> {
        u.view_proj * Vector4::new(x, y, 0., 1.)
    }

    #[test]
    fn frame_fills_matching_target() {
        let u = CameraUniform::fit(1920, 1080);
        let corner = project(&u, FRAME_WIDTH / 2., FRAME_HEIGHT / 2.);
        assert!((corner.x - 1.).abs() < 1e-5);
        assert!((corner.y - 1.).abs() < 1e-5);
        assert!(project(&u, 0., 0.).x.abs() < 1e-6);
    }

    #[test]
    fn wide_target_is_pillarboxed() {
        let u = CameraUniform::fit(2000, 500);
        let right = project(&u, FRAME_WIDTH / 2., 0.);
        assert!(right.x < 1.);
        let top = project(&u, 0., FRAME_HEIGHT / 2.);
        assert!((top.y - 1.).abs() < 1e-5);
    }

    #[test]
    fn uniform_is_a_mat4() {
        assert_eq!(CameraUniform::fit(1, 1).bytes().unwrap().len(), 64);
    }
}
