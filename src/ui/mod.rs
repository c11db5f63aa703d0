use std::num::NonZeroU32;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Fullscreen, Window, WindowId};
use softbuffer::Surface;

use crate::ui::state::{command_for_key, Command, Outcome, ViewerState};

pub mod render;
pub mod state;

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App {
    pub state: ViewerState,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
}

impl App {
    pub fn new(state: ViewerState) -> Self {
        Self {
            state,
            window: None,
            context: None,
            surface: None,
        }
    }

    fn dispatch(&mut self, event_loop: &ActiveEventLoop, command: Command) {
        let outcome = self.state.apply(command);
        self.handle_outcome(event_loop, outcome);
    }

    fn handle_outcome(&mut self, event_loop: &ActiveEventLoop, outcome: Outcome) {
        let Some(ref window) = self.window else {
            return;
        };
        match outcome {
            Outcome::Idle => {}
            Outcome::Redraw => window.request_redraw(),
            Outcome::ToggleFullscreen => {
                if self.state.is_fullscreen {
                    window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                } else {
                    window.set_fullscreen(None);
                }
                window.request_redraw();
            }
            Outcome::Quit => event_loop.exit(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.state.title())
            .with_inner_size(LogicalSize::new(1280u32, 720u32));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));
        let context = softbuffer::Context::new(Arc::clone(&window)).expect("create context");
        let surface = Surface::new(&context, Arc::clone(&window)).expect("create surface");

        event_loop.set_control_flow(ControlFlow::Wait);
        window.request_redraw();
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let (Some(surface), Some(w), Some(h)) = (
                    self.surface.as_mut(),
                    NonZeroU32::new(width.max(1)),
                    NonZeroU32::new(height.max(1)),
                ) {
                    if let Err(e) = surface.resize(w, h) {
                        log::error!("Failed to resize surface: {}", e);
                    }
                }
                self.handle_outcome(event_loop, Outcome::Redraw);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let Some(command) = command_for_key(&event.logical_key) {
                    self.dispatch(event_loop, command);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => y as f32 / 40.0,
                };
                if y.abs() > 0.1 {
                    // Wheel up goes back.
                    let step = if y > 0.0 { -1 } else { 1 };
                    self.dispatch(event_loop, Command::Move(step));
                }
            }

            WindowEvent::DroppedFile(path) => {
                let outcome = self.state.open(&path);
                self.handle_outcome(event_loop, outcome);
            }

            WindowEvent::RedrawRequested => {
                let Some(window) = self.window.clone() else {
                    return;
                };
                if let Some(ref mut surface) = self.surface {
                    let size = window.inner_size();
                    let fb_w = size.width.max(1);
                    let fb_h = size.height.max(1);
                    match surface.buffer_mut() {
                        Ok(mut buffer) => {
                            self.state.render(&mut buffer, fb_w, fb_h);
                            if let Err(e) = buffer.present() {
                                log::error!("Failed to present frame: {}", e);
                            }
                        }
                        Err(e) => log::error!("Failed to map frame buffer: {}", e),
                    }
                }
                window.set_title(&self.state.title());
            }

            _ => {}
        }
    }
}
