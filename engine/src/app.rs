//! Application shell driving the renderer from a winit event loop

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::graphics::{DebugView, RenderContext, Renderer};
use crate::input::InputState;
use crate::scene::Scene;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, trace};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

/// Called once after the renderer exists, to populate the scene
pub type InitCallback = Box<dyn FnOnce(&mut Renderer, &mut Scene) -> Result<(), RenderError>>;

/// Called every frame before rendering with the elapsed milliseconds
pub type UpdateCallback = Box<dyn FnMut(&mut Scene, f32)>;

/// Configuration for engine initialization
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window title
    pub window_title: String,
    /// Window size (None = use primary monitor size)
    pub window_size: Option<(u32, u32)>,
    /// Renderer tuning
    pub renderer: RendererConfig,
    /// Custom logging filter (None = default)
    pub log_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_title: "Umbra".to_string(),
            window_size: None,
            renderer: RendererConfig::default(),
            log_filter: None,
        }
    }
}

/// Main engine application struct that implements ApplicationHandler
pub struct EngineApp {
    /// Renderer, created on the first resume
    pub renderer: Option<Renderer>,
    /// Flat list of renderables and lights
    pub scene: Scene,
    /// Input state
    pub input_state: InputState,

    config: EngineConfig,
    window: Option<Arc<Window>>,
    on_init: Option<InitCallback>,
    on_update: Option<UpdateCallback>,
    last_time: Instant,
    fatal: Option<RenderError>,
}

impl EngineApp {
    /// Create a new engine app with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new engine app with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        crate::init_logging_with(config.log_filter.as_deref());
        info!(title = %config.window_title, size = ?config.window_size, "Creating EngineApp");

        Self {
            renderer: None,
            scene: Scene::new(),
            input_state: InputState::new(),
            config,
            window: None,
            on_init: None,
            on_update: None,
            last_time: Instant::now(),
            fatal: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.renderer.is_some()
    }

    /// Run the event loop until the window closes
    ///
    /// An error that ended the loop early is returned.
    pub fn run(mut self) -> Result<(), RenderError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        match self.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RenderError> {
        info!("Initializing EngineApp");

        let (width, height) = self.config.window_size.unwrap_or_else(|| {
            event_loop
                .primary_monitor()
                .map(|monitor| {
                    let size = monitor.size();
                    info!(width = size.width, height = size.height, "Using primary monitor resolution");
                    (size.width, size.height)
                })
                .unwrap_or((1280, 720))
        });

        let attributes = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let context = pollster::block_on(RenderContext::new(instance.clone(), Some(&surface)))?;

        let size = window.inner_size();
        let mut renderer = Renderer::for_surface(
            Arc::new(context),
            surface,
            size.width,
            size.height,
            self.config.renderer.clone(),
        )?;

        if let Some(on_init) = self.on_init.take() {
            on_init(&mut renderer, &mut self.scene)?;
        }
        info!(
            renderables = self.scene.renderable_count(),
            lights = self.scene.light_count(),
            "Scene ready"
        );

        self.renderer = Some(renderer);
        self.window = Some(window);
        self.last_time = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RenderError) {
        error!(error = %err, "Fatal renderer error");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if let (Some(index), Some(renderer)) = (debug_view_index(code), &mut self.renderer) {
            if let Some(view) = DebugView::from_index(index) {
                renderer.set_debug_view(view);
            }
        }
    }

    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let delta_ms = (now - self.last_time).as_secs_f32() * 1000.0;
        self.last_time = now;

        if let Some(on_update) = &mut self.on_update {
            on_update(&mut self.scene, delta_ms);
        }

        let Some(renderer) = &mut self.renderer else {
            return;
        };
        let result = renderer.render(&mut self.scene, &self.input_state, delta_ms);
        self.input_state.end_frame();

        match result {
            Ok(timings) => trace!(cpu_ms = timings.cpu_ms, gpu_ms = timings.gpu_ms, "Frame"),
            Err(err) if err.is_surface_outdated() => {
                info!("Surface lost or outdated, reconfiguring");
                renderer.reconfigure_surface();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                debug!("Surface acquire timed out, skipping frame");
            }
            Err(err) => self.fail(event_loop, err),
        }
    }
}

/// Digit keys 0-8 select the deferred debug view
fn debug_view_index(code: KeyCode) -> Option<u32> {
    let index = match code {
        KeyCode::Digit0 => 0,
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        _ => return None,
    };
    Some(index)
}

impl ApplicationHandler for EngineApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.is_initialized() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|window| window.id()) != Some(window_id) {
            return;
        }

        self.input_state.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                info!("Main window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                debug!(width = size.width, height = size.height, "Window resized");
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(focused) => debug!(focused, "Window focus changed"),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Builder pattern for EngineApp configuration
pub struct EngineBuilder {
    config: EngineConfig,
    on_init: Option<InitCallback>,
    on_update: Option<UpdateCallback>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            on_init: None,
            on_update: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.window_title = title.into();
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.config.window_size = Some((width, height));
        self
    }

    pub fn renderer_config(mut self, config: RendererConfig) -> Self {
        self.config.renderer = config;
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = Some(filter.into());
        self
    }

    /// Populate the scene once the GPU is available
    pub fn on_init(
        mut self,
        f: impl FnOnce(&mut Renderer, &mut Scene) -> Result<(), RenderError> + 'static,
    ) -> Self {
        self.on_init = Some(Box::new(f));
        self
    }

    /// Mutate the scene before each frame
    pub fn on_update(mut self, f: impl FnMut(&mut Scene, f32) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn build(self) -> EngineApp {
        let mut app = EngineApp::with_config(self.config);
        app.on_init = self.on_init;
        app.on_update = self.on_update;
        app
    }
}

impl Default for EngineApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_view_keys() {
        assert_eq!(debug_view_index(KeyCode::Digit0), Some(0));
        assert_eq!(debug_view_index(KeyCode::Digit8), Some(8));
        assert_eq!(debug_view_index(KeyCode::Digit9), None);
        assert_eq!(debug_view_index(KeyCode::KeyW), None);
        for code in [KeyCode::Digit1, KeyCode::Digit5, KeyCode::Digit8] {
            let index = debug_view_index(code).unwrap();
            assert!(DebugView::from_index(index).is_some());
        }
    }

    #[test]
    fn test_builder_collects_config() {
        let mut renderer = RendererConfig::default();
        renderer.shadow.map_size = 512;
        let builder = EngineBuilder::new()
            .title("Shadows")
            .window_size(800, 600)
            .renderer_config(renderer)
            .log_filter("debug");

        let config = builder.config();
        assert_eq!(config.window_title, "Shadows");
        assert_eq!(config.window_size, Some((800, 600)));
        assert_eq!(config.renderer.shadow.map_size, 512);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.window_title, "Umbra");
        assert!(config.window_size.is_none());
        assert_eq!(config.renderer, RendererConfig::default());
    }
}
