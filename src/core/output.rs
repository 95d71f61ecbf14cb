use std::path::{Path, PathBuf};

use super::{
    renderer::Renderer,
    scene::{Player, Scene},
    utils::context::{AnyContext, Context},
};
use crate::error::{Error, Result};

pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const PIXEL_STRIDE: u32 = 4;

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub size: (u32, u32),
    pub fps: u32,
    pub single_frame: bool,
}

/// Number of frames covering `duration` seconds; frame `k` shows time `k / fps`.
pub fn frame_count(duration: f32, fps: u32) -> usize {
    ((duration * fps as f32).ceil() as usize).max(1)
}

pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:05}.png"))
}

/// An offscreen texture plus the buffer its pixels are copied into.
pub struct FrameTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    buffer: wgpu::Buffer,
    size: (u32, u32),
    bytes_per_row: u32,
}

impl FrameTarget {
    pub fn new(ctx: &impl AnyContext, (width, height): (u32, u32)) -> Self {
        let texture = ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // bytes per row must be aligned to COPY_BYTES_PER_ROW_ALIGNMENT
        let bytes_per_row =
            wgpu::util::align_to(width * PIXEL_STRIDE, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Readback Buffer"),
            size: (bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            buffer,
            size: (width, height),
            bytes_per_row,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn copy_to_buffer(&self, encoder: &mut wgpu::CommandEncoder) {
        let (width, height) = self.size;
        encoder.copy_texture_to_buffer(
            self.texture.as_image_copy(),
            wgpu::ImageCopyBuffer {
                buffer: &self.buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(self.bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Maps the readback buffer and returns tightly packed RGBA rows.
    pub async fn read(&self, ctx: &impl AnyContext) -> Result<Vec<u8>> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();

        // We have to create the mapping THEN device.poll() before await
        // the future. Otherwise the application will freeze.
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device().poll(wgpu::Maintain::Wait);
        rx.await.map_err(|_| Error::BufferMapCancelled)??;

        let row = (self.size.0 * PIXEL_STRIDE) as usize;
        let mut pixels = Vec::with_capacity(row * self.size.1 as usize);
        {
            let view = slice.get_mapped_range();
            for chunk in view.chunks(self.bytes_per_row as usize) {
                pixels.extend_from_slice(&chunk[..row]);
            }
        }
        self.buffer.unmap();
        Ok(pixels)
    }

    pub fn save(&self, pixels: &[u8], path: &Path) -> Result<()> {
        let (width, height) = self.size;
        image::save_buffer(path, pixels, width, height, image::ExtendedColorType::Rgba8)?;
        Ok(())
    }
}

async fn write_frame(
    ctx: &Context,
    renderer: &mut Renderer,
    target: &FrameTarget,
    player: &Player,
    path: &Path,
) -> Result<()> {
    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
    renderer.render(
        ctx,
        &mut encoder,
        target.view(),
        player.stage(),
        player.background(),
    );
    target.copy_to_buffer(&mut encoder);
    ctx.queue().submit(std::iter::once(encoder.finish()));
    let pixels = target.read(ctx).await?;
    target.save(&pixels, path)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Renders the scene headlessly into a PNG sequence under `settings.dir`.
pub async fn render_to_files(scene: Scene, settings: &OutputSettings) -> Result<usize> {
    let ctx = Context::init().await?;
    let mut renderer = Renderer::new(&ctx, OUTPUT_FORMAT, settings.size)?;
    let target = FrameTarget::new(&ctx, settings.size);
    std::fs::create_dir_all(&settings.dir)?;

    let mut player = Player::new(scene);
    let frames = frame_count(player.duration(), settings.fps);
    let dt = 1. / settings.fps as f32;

    if settings.single_frame {
        player.finish();
        let path = frame_path(&settings.dir, frames - 1);
        write_frame(&ctx, &mut renderer, &target, &player, &path).await?;
        log::info!("Wrote the last frame to {}", path.display());
        return Ok(1);
    }

    player.advance(0.);
    for index in 0..frames {
        if index > 0 {
            player.advance(dt);
        }
        let path = frame_path(&settings.dir, index);
        write_frame(&ctx, &mut renderer, &target, &player, &path).await?;
        if index % settings.fps as usize == 0 {
            log::info!("Frame {index}/{frames}");
        }
    }
    log::info!("Wrote {frames} frames to {}", settings.dir.display());
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::{test_utils::square, FadeIn};
    use crate::geometry::ORIGIN;
    use crate::play;

    fn settings(name: &str, single_frame: bool) -> OutputSettings {
        let name = format!("cyberscene-{name}-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        OutputSettings {
            dir,
            size: (64, 36),
            fps: 4,
            single_frame,
        }
    }

    fn scene() -> Scene {
        let mut scene = Scene::new(Default::default());
        play!(scene, FadeIn::new(square(ORIGIN, 2.)));
        scene
    }

    fn render(settings: &OutputSettings) -> Option<usize> {
        match pollster::block_on(render_to_files(scene(), settings)) {
            Err(Error::NoAdapter) => {
                eprintln!("no GPU adapter, skipping");
                None
            }
            result => Some(result.unwrap()),
        }
    }

    #[test]
    fn frames_cover_the_duration() {
        assert_eq!(frame_count(27.4, 15), 411);
        assert_eq!(frame_count(1., 60), 60);
        assert_eq!(frame_count(0., 30), 1);
    }

    #[test]
    fn frames_are_numbered() {
        let path = frame_path(Path::new("media/cyber_attack"), 42);
        assert_eq!(path, Path::new("media/cyber_attack/frame_00042.png"));
    }

    #[test]
    fn writes_one_png_per_frame() {
        let settings = settings("sequence", false);
        let Some(frames) = render(&settings) else { return };
        assert_eq!(frames, 4);
        for index in 0..4 {
            let path = frame_path(&settings.dir, index);
            let frame = image::open(&path).unwrap();
            assert_eq!((frame.width(), frame.height()), (64, 36));
        }
        assert!(!frame_path(&settings.dir, 4).exists());
        let _ = std::fs::remove_dir_all(&settings.dir);
    }

    #[test]
    fn single_frame_writes_the_end_state() {
        let settings = settings("single", true);
        let Some(frames) = render(&settings) else { return };
        assert_eq!(frames, 1);
        let last = image::open(frame_path(&settings.dir, 3)).unwrap().to_rgba8();
        // the faded-in square covers the center
        let center = last.get_pixel(32, 18);
        assert!(center[2] > center[0]);
        assert!(!frame_path(&settings.dir, 0).exists());
        let _ = std::fs::remove_dir_all(&settings.dir);
    }
}
