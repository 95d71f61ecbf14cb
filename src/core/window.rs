use std::{sync::Arc, time::Instant};

use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
};

use super::{
    renderer::Renderer,
    scene::{Player, Scene},
    utils::context::{Context, SurfaceContext},
};
use crate::error::Result;

pub trait App {
    fn resize(&mut self, ctx: &SurfaceContext) -> Result<()>;
    fn render(&mut self, ctx: &SurfaceContext) -> Result<(), wgpu::SurfaceError>;
    fn update(&mut self, ctx: &SurfaceContext);
}

pub struct Window {
    window: Arc<winit::window::Window>,
    pub event_loop: EventLoop<()>,
}

impl Window {
    pub fn new(title: &str, (width, height): (u32, u32)) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let window = Arc::new(
            winit::window::WindowBuilder::new()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(width, height))
                .build(&event_loop)?,
        );

        Ok(Self { event_loop, window })
    }

    pub fn get_window(&self) -> Arc<winit::window::Window> {
        Arc::clone(&self.window)
    }

    pub fn run<T: App>(self, mut ctx: SurfaceContext, mut app: T) -> Result<()> {
        self.event_loop.run(move |event, target| {
            let Event::WindowEvent { event, .. } = event else {
                return;
            };

            match event {
                WindowEvent::Resized(new_size) => {
                    ctx.resize(new_size);
                    if let Err(e) = app.resize(&ctx) {
                        log::error!("Resize failed: {e}");
                        target.exit();
                    }
                    self.window.request_redraw();
                }
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => target.exit(),
                WindowEvent::RedrawRequested => {
                    self.window.request_redraw();
                    app.update(&ctx);
                    match app.render(&ctx) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            log::error!("Surface lost or outdated");
                            target.exit();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("OutOfMemory");
                            target.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
                    }
                }
                _ => {}
            };
        })?;
        Ok(())
    }
}

/// Plays the timeline in real time; the last frame stays up after the end.
struct Preview {
    player: Player,
    renderer: Renderer,
    last: Instant,
}

impl App for Preview {
    fn resize(&mut self, ctx: &SurfaceContext) -> Result<()> {
        self.renderer.resize(ctx, ctx.size())
    }

    fn update(&mut self, _ctx: &SurfaceContext) {
        let now = Instant::now();
        self.player.advance((now - self.last).as_secs_f32());
        self.last = now;
    }

    fn render(&mut self, ctx: &SurfaceContext) -> Result<(), wgpu::SurfaceError> {
        let frame = ctx.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(ctx.view_format()),
            ..Default::default()
        });
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Preview Encoder"),
            });
        self.renderer.render(
            ctx,
            &mut encoder,
            &view,
            self.player.stage(),
            self.player.background(),
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}

pub async fn preview(scene: Scene, size: (u32, u32)) -> Result<()> {
    let window = Window::new("Cyber Attack Simulation", size)?;
    let ctx = Context::init().await?.attach_window(window.get_window())?;
    let renderer = Renderer::new(&ctx, ctx.view_format(), ctx.size())?;

    let mut player = Player::new(scene);
    player.advance(0.);
    log::info!("Previewing {:.1}s, press Escape to quit", player.duration());

    let app = Preview {
        player,
        renderer,
        last: Instant::now(),
    };
    window.run(ctx, app)
}
