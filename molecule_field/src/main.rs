//! Molecule Field
//!
//! Star field and drifting CH4 molecules. Move the pointer to tilt the
//! molecules; close the window to quit.
//!
//! Logging goes through `env_logger`, filtered by `RUST_LOG` (default `info`).

use common::{GraphicsContext, GraphicsError};
use molecule_field::{
    config::SceneConfig,
    renderer::Renderer,
    scene::Scene,
    viewport::{handle_resize, OutputSurface, Viewport},
};
use winit::{
    event::{Event, WindowEvent},
    event_loop::ControlFlow,
};

struct App {
    ctx: GraphicsContext,
    renderer: Renderer,
    scene: Scene,
}

impl App {
    fn new(ctx: GraphicsContext, config: &SceneConfig) -> Self {
        let mut rng = rand::thread_rng();
        let scene = Scene::assemble(config, ctx.output_viewport(), &mut rng);
        let renderer = Renderer::new(&ctx, &scene);

        Self {
            ctx,
            renderer,
            scene,
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        if handle_resize(&mut self.scene.camera, &mut self.ctx, viewport) {
            self.renderer
                .resize(&self.ctx.device, viewport.width, viewport.height);
        }
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        let viewport = self.ctx.output_viewport();
        let scale_factor = self.ctx.window.scale_factor();
        self.scene.state.pointer.track(x, y, viewport, scale_factor);
    }

    /// One tick of the animation: advance a frame, then draw it
    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.scene.advance(1);
        self.render()
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let counts = self.renderer.update_scene(&self.ctx.queue, &self.scene);

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view, counts);

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn main() -> Result<(), GraphicsError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SceneConfig::default();
    let (ctx, event_loop) =
        pollster::block_on(GraphicsContext::new("Molecule Field", 1280, 720))?;

    let mut app = App::new(ctx, &config);

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => app.resize(size.into()),
                WindowEvent::CursorMoved { position, .. } => {
                    app.pointer_moved(position.x, position.y);
                }
                WindowEvent::RedrawRequested => match app.frame() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        log::warn!("Surface lost, reconfiguring");
                        app.ctx.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory, exiting");
                        elwt.exit();
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                },
                _ => {}
            },
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
