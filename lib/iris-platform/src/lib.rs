use std::{
    ffi::CString,
    num::NonZeroU32,
    path::PathBuf,
    time::{Duration, Instant},
};

use eyre::{eyre, Context, Result};
use glam::Vec2;
use glutin::{
    config::{Api, Config, ConfigTemplateBuilder},
    context::{ContextApi, ContextAttributesBuilder, Version},
    display::{Display, DisplayApiPreference, GetGlDisplay},
    prelude::*,
    surface::{SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use iris::GraphicsContext;
use iris_gl::{gl, GlContext};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
pub use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event_loop::{ControlFlow, EventLoopWindowTarget};
pub use winit::window::WindowBuilder;
use winit::{
    event::{ElementState, Event, KeyboardInput, StartCause, VirtualKeyCode, WindowEvent},
    event_loop::EventLoopBuilder,
    window::{Fullscreen, Window},
};

pub mod tracing_hook;

const FRAME_INTERVAL: Duration = Duration::from_nanos(16_666_667);

/// Window and context settings.
#[derive(Debug, Clone)]
pub struct WindowDesc {
    pub title: String,
    pub logical_size: Vec2,
    /// Requested OpenGL version, always with the core profile.
    pub gl_version: (u8, u8),
    pub vsync: bool,
    /// Minimum depth buffer precision, in bits.
    pub depth_bits: u8,
    pub fullscreen: bool,
    /// JSON-lines log of every event, written alongside the console output.
    pub log_file: Option<PathBuf>,
}

impl Default for WindowDesc {
    fn default() -> Self {
        Self {
            title: "iris".to_string(),
            logical_size: Vec2::new(1280., 720.),
            gl_version: (3, 3),
            vsync: true,
            depth_bits: 24,
            fullscreen: false,
            log_file: Some(PathBuf::from("log.jsonl")),
        }
    }
}

impl WindowDesc {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct RenderContext<'gc, 'flow> {
    pub gc: &'gc GlContext,
    pub elapsed: Duration,
    pub dt: Duration,
    control_flow: &'flow mut ControlFlow,
}

impl<'gc, 'flow> RenderContext<'gc, 'flow> {
    pub fn quit(&mut self) {
        self.control_flow.set_exit();
    }
}

#[allow(unused_variables)]
pub trait Application: Sized {
    fn window_features(wb: WindowBuilder) -> WindowBuilder {
        wb
    }
    /// Create the GPU resources. Runs once, with the context current.
    fn setup(gc: &GlContext, size: PhysicalSize<u32>) -> Result<Self>;
    fn resize(&mut self, gc: &GlContext, size: PhysicalSize<u32>) -> Result<()> {
        gc.viewport(0, 0, size.width as _, size.height as _);
        Ok(())
    }
    fn interact(&mut self, event: WindowEvent) -> Result<()> {
        Ok(())
    }
    fn render(&mut self, ctx: RenderContext) -> Result<()>;
    fn teardown(self, gc: &GlContext) {}
}

fn log_gl_info(gc: &GlContext) {
    let query = |name| iris_gl::get_string(gc.gl(), name).unwrap_or_else(|| "<None>".to_string());
    tracing::info!(
        target: "gl",
        version = %query(gl::VERSION),
        vendor = %query(gl::VENDOR),
        renderer = %query(gl::RENDERER),
        shading_language = %query(gl::SHADING_LANGUAGE_VERSION)
    );
}

/// Prefer an OpenGL config with at least `depth_bits` of depth, else take the first one offered.
fn pick_config(configs: impl Iterator<Item = Config>, depth_bits: u8) -> Option<Config> {
    let usable = |c: &Config| c.api().contains(Api::OPENGL) && c.depth_size() >= depth_bits;
    configs
        .inspect(|config| tracing::debug!(message="Potential config", api=?config.api(), depth_size=%config.depth_size()))
        .reduce(|best, config| {
            if usable(&config) && !usable(&best) {
                config
            } else {
                best
            }
        })
}

fn create_window<T>(
    target: &EventLoopWindowTarget<T>,
    window_builder: WindowBuilder,
    template: ConfigTemplateBuilder,
    depth_bits: u8,
) -> Result<(Window, Config)> {
    // WGL needs the window before the display.
    #[cfg(target_os = "windows")]
    let (early_window, preference, template) = {
        let window = window_builder
            .clone()
            .build(target)
            .context("Cannot create window")?;
        let handle = window.raw_window_handle();
        (
            Some(window),
            DisplayApiPreference::Wgl(Some(handle)),
            template.compatible_with_native_window(handle),
        )
    };
    #[cfg(target_os = "macos")]
    let (early_window, preference, template) = (None::<Window>, DisplayApiPreference::Cgl, template);
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let (early_window, preference, template) = (
        None::<Window>,
        DisplayApiPreference::EglThenGlx(Box::new(winit::platform::x11::register_xlib_error_hook)),
        template,
    );

    let display = unsafe { Display::new(target.raw_display_handle(), preference) }
        .context("Cannot open OpenGL display")?;
    let configs = unsafe { display.find_configs(template.build()) }
        .context("Cannot list OpenGL configurations")?;
    let gl_config = pick_config(configs, depth_bits)
        .ok_or_else(|| eyre!("No OpenGL configuration available"))?;
    let window = match early_window {
        Some(window) => window,
        None => glutin_winit::finalize_window(target, window_builder, &gl_config)
            .context("Cannot create window")?,
    };
    Ok((window, gl_config))
}

/// Open a window, create an OpenGL context for it and drive `App` until the window closes.
///
/// Only returns on setup failure. Errors from a single frame are logged and the next frame
/// runs normally.
pub fn run<App: 'static + Application>(desc: WindowDesc) -> Result<()> {
    tracing_hook::enable(desc.log_file.as_deref())?;

    let event_loop = EventLoopBuilder::new().build();
    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_depth_size(desc.depth_bits);

    let window_builder = App::window_features(
        WindowBuilder::new()
            .with_title(&desc.title)
            .with_inner_size(LogicalSize::new(desc.logical_size.x, desc.logical_size.y))
            .with_fullscreen(desc.fullscreen.then_some(Fullscreen::Borderless(None))),
    );
    let (window, gl_config) = create_window(&event_loop, window_builder, template, desc.depth_bits)?;
    tracing::debug!(message="Using config", api=?gl_config.api(), depth_size=%gl_config.depth_size());
    if gl_config.depth_size() < desc.depth_bits {
        tracing::warn!(
            requested = desc.depth_bits,
            available = gl_config.depth_size(),
            "Depth buffer is less precise than requested"
        );
    }

    let raw_window_handle = Some(window.raw_window_handle());
    let gl_display = gl_config.display();
    let (major, minor) = desc.gl_version;
    let context_attributes = ContextAttributesBuilder::new()
        .with_debug(cfg!(debug_assertions))
        .with_profile(glutin::context::GlProfile::Core)
        .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
        .build(raw_window_handle);

    let not_current_gl_context = unsafe {
        gl_display
            .create_context(&gl_config, &context_attributes)
            .context("Cannot create OpenGL display context")?
    };
    let inner_size = window.inner_size();
    let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        window.raw_window_handle(),
        NonZeroU32::try_from(inner_size.width).context("Window has a zero width")?,
        NonZeroU32::try_from(inner_size.height).context("Window has a zero height")?,
    );
    let gl_surface = unsafe {
        gl_display
            .create_window_surface(&gl_config, &attrs)
            .context("Cannot create window surface")?
    };
    let context = not_current_gl_context
        .make_current(&gl_surface)
        .context("Cannot make OpenGL context current")?;
    let interval = if desc.vsync {
        SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        SwapInterval::DontWait
    };
    if let Err(err) = gl_surface.set_swap_interval(&context, interval) {
        tracing::warn!(%err, "Cannot set swap interval");
    }

    let gc = GlContext::load_with(|sym| match CString::new(sym) {
        Ok(sym) => gl_display.get_proc_address(sym.as_c_str()).cast(),
        Err(_) => std::ptr::null(),
    });
    iris_gl::debug::hook_gl_to_tracing(&gc);
    log_gl_info(&gc);

    let mut app = Some(App::setup(&gc, inner_size).context("Cannot set up application")?);

    let start = Instant::now();
    let mut last_frame_time = Instant::now();
    let mut next_frame_time = Instant::now() + FRAME_INTERVAL;
    event_loop.run(move |event, _, control_flow| {
        control_flow.set_wait_until(next_frame_time);
        let Some(running) = app.as_mut() else {
            return;
        };

        match event {
            Event::RedrawRequested(_) => {
                let _span = tracing::trace_span!("frame").entered();
                let frame_start = Instant::now();
                let result = running.render(RenderContext {
                    gc: &gc,
                    elapsed: start.elapsed(),
                    dt: last_frame_time.elapsed(),
                    control_flow,
                });
                if let Err(err) = result {
                    tracing::error!("Frame skipped: {err:?}");
                }
                if let Err(err) = gl_surface.swap_buffers(&context) {
                    tracing::error!(%err, "Cannot swap buffers");
                }
                let frame_time = frame_start.elapsed().as_secs_f32();
                tracing::debug!(%frame_time);
                next_frame_time = frame_start + FRAME_INTERVAL;
                last_frame_time = Instant::now();
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => control_flow.set_exit(),
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            virtual_keycode: Some(VirtualKeyCode::F11),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => {
                    if window.fullscreen().is_some() {
                        window.set_fullscreen(None)
                    } else {
                        window.set_fullscreen(Some(Fullscreen::Borderless(None)))
                    }
                }
                WindowEvent::Resized(new_size) => {
                    let (Some(width), Some(height)) =
                        (NonZeroU32::new(new_size.width), NonZeroU32::new(new_size.height))
                    else {
                        return;
                    };
                    gl_surface.resize(&context, width, height);
                    if let Err(err) = running.resize(&gc, new_size) {
                        tracing::error!("Cannot resize: {err:?}");
                    }
                    window.request_redraw();
                }
                event => {
                    if let Err(err) = running.interact(event) {
                        tracing::error!("Cannot handle window event: {err:?}");
                    }
                }
            },
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => window.request_redraw(),
            Event::LoopDestroyed => {
                if let Some(app) = app.take() {
                    app.teardown(&gc);
                }
            }
            _ => {}
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_list_picks_nothing() {
        assert!(pick_config(std::iter::empty(), 24).is_none());
    }
}
