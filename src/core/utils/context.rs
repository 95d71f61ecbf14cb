use std::sync::Arc;

use winit::dpi::PhysicalSize;

use crate::error::{Error, Result};

pub trait AnyContext {
    fn device(&self) -> &wgpu::Device;
    fn queue(&self) -> &wgpu::Queue;
}

macro_rules! impl_context {
    ($type:ty) => {
        impl AnyContext for $type {
            fn device(&self) -> &wgpu::Device {
                &self.device
            }
            fn queue(&self) -> &wgpu::Queue {
                &self.queue
            }
        }
    };
}

impl_context!(Context);
impl_context!(SurfaceContext);

/// A headless device, enough for rendering into offscreen textures.
pub struct Context {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Context {
    pub async fn init() -> Result<Self> {
        log::info!("Initializing wgpu context...");

        let instance = wgpu::Instance::default();
        let adapter = wgpu::util::initialize_adapter_from_env_or_default(&instance, None)
            .await
            .ok_or(Error::NoAdapter)?;
        let adapter_info = adapter.get_info();
        log::info!("Using {} ({:?})", adapter_info.name, adapter_info.backend);

        let trace_dir = std::env::var("WGPU_TRACE");
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                trace_dir.ok().as_ref().map(std::path::Path::new),
            )
            .await?;
        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn attach_window(self, window: Arc<winit::window::Window>) -> Result<SurfaceContext> {
        let mut size = window.inner_size();
        size.width = size.width.max(1);
        size.height = size.height.max(1);
        let surface = self.instance.create_surface(window)?;

        let mut config = surface
            .get_default_config(&self.adapter, size.width, size.height)
            .ok_or(Error::UnsupportedSurface)?;

        // Not all platforms (WebGPU) support sRGB swapchains, so we need to use view formats
        let view_format = config.format.add_srgb_suffix();
        config.view_formats.push(view_format);

        surface.configure(&self.device, &config);
        Ok(SurfaceContext {
            device: self.device,
            queue: self.queue,
            surface,
            config,
        })
    }
}

pub struct SurfaceContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl SurfaceContext {
    /// The format frames are rendered in, an sRGB view of the surface texture.
    pub fn view_format(&self) -> wgpu::TextureFormat {
        self.config
            .view_formats
            .first()
            .copied()
            .unwrap_or(self.config.format)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        log::info!("Surface resize {size:?}");

        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }
}
