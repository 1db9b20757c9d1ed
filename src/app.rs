use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

#[cfg(feature = "audio")]
use crate::sound::{Cue, Speaker};
use crate::{
    screen,
    virtual_buffer::VirtualDisplay,
    visualizer::{self, Command, StackVisualizer},
};

/// The Application GUI
pub struct App {
    /// The Application's window
    window: Option<Arc<Window>>,
    /// The application's rendering plane
    pixels: Option<Pixels<'static>>,
    /// Everything the widget shows. Only replaced through [`visualizer::reduce`].
    state: StackVisualizer,
    /// Canvas the widget is drawn on before being copied into [`Self::pixels`]
    display: VirtualDisplay,
    /// Last known cursor position in physical window coordinates
    cursor: Option<PhysicalPosition<f64>>,
    /// Whether the explanation card is drawn over the widget
    show_help: bool,
    #[cfg(feature = "audio")]
    speaker: Option<Speaker>,
}

impl App {
    /// Construct a new application around an initial state
    pub fn new(state: StackVisualizer, scale_factor: usize) -> Self {
        Self {
            window: None,
            pixels: None,
            state,
            display: VirtualDisplay::new(scale_factor),
            cursor: None,
            show_help: false,
            #[cfg(feature = "audio")]
            speaker: None,
        }
    }

    /// Enables sound cues if an output device can be opened
    #[cfg(feature = "audio")]
    pub fn with_sound(mut self) -> Self {
        self.speaker = Speaker::new();
        self
    }

    /// Runs `command` through the reducer and schedules a redraw
    fn dispatch(&mut self, command: Command) {
        log::trace!("Dispatching {:?}", command);
        let depth = self.state.stack().len();

        let state = std::mem::take(&mut self.state);
        self.state = visualizer::reduce(state, command.clone());

        if self.state.stack().len() != depth {
            self.play_cue(&command);
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    #[cfg(feature = "audio")]
    fn play_cue(&self, command: &Command) {
        let cue = match command {
            Command::Push | Command::Submit => Cue::Push,
            Command::Pop => Cue::Pop,
            Command::Clear => Cue::Clear,
            _ => return,
        };

        if let Some(speaker) = &self.speaker {
            speaker.play(cue);
        }
    }

    #[cfg(not(feature = "audio"))]
    fn play_cue(&self, _command: &Command) {}

    fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        log::debug!("Help card {}", if self.show_help { "opened" } else { "closed" });

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Draws the widget and presents it
    fn draw(&mut self) {
        if let Some(pixels) = &mut self.pixels {
            screen::draw(&self.state, self.show_help, &mut self.display);
            self.display.render_to_buffer(pixels.frame_mut());

            if let Err(e) = pixels.render() {
                log::error!("Rendering failed: {:?}", e);
            }
        }
    }

    /// Handles a left click at the last cursor position
    fn click(&mut self) {
        let (Some(pixels), Some(cursor)) = (&self.pixels, self.cursor) else {
            return;
        };

        let position = (cursor.x as f32, cursor.y as f32);
        let Ok((x, y)) = pixels.window_pos_to_pixel(position) else {
            return;
        };

        let (x, y) = self.display.to_virtual(x, y);
        if let Some(button) = screen::button_at(x, y) {
            log::debug!("Clicked {:?}", button);
            self.dispatch(button.command());
        }
    }
}

/// Maps a key press to the commands it triggers
fn key_commands(logical_key: &Key, text: Option<&str>) -> Vec<Command> {
    match logical_key {
        Key::Named(NamedKey::Enter) => vec![Command::Submit],
        Key::Named(NamedKey::Backspace) => vec![Command::Backspace],
        Key::Named(NamedKey::ArrowUp) => vec![Command::Pop],
        Key::Named(NamedKey::Delete) => vec![Command::Clear],
        _ => text
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_control())
            .map(Command::Type)
            .collect(),
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let width = self.display.scaled_width() as u32;
        let height = self.display.scaled_height() as u32;

        // The window is an Arc in order to have an owned shared reference with the pixels plane
        log::info!("Creating window ({}x{})", width, height);
        let window = Arc::new(
            match event_loop.create_window(
                Window::default_attributes()
                    .with_title("x86-64 Stack Visualizer")
                    .with_inner_size(LogicalSize::new(width, height)),
            ) {
                Ok(w) => w,
                Err(e) => {
                    log::error!("Error constructing window: {:?}", e);
                    std::process::exit(1);
                }
            },
        );

        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = match Pixels::new(width, height, surface_texture) {
            Ok(p) => p,
            Err(e) => {
                log::error!("Error constructing pixel buffer: {:?}", e);
                std::process::exit(1);
            }
        };

        self.pixels = Some(pixels);
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("Close requested, stopping...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        logical_key,
                        text,
                        ..
                    },
                ..
            } => {
                log::trace!("Keyboard Input: {:?}, {:?}", logical_key, text);
                match logical_key {
                    Key::Named(NamedKey::F1) => {
                        self.toggle_help();
                        return;
                    }
                    // escape closes the help card first, then the application
                    Key::Named(NamedKey::Escape) if self.show_help => {
                        self.toggle_help();
                        return;
                    }
                    Key::Named(NamedKey::Escape) => {
                        event_loop.exit();
                        return;
                    }
                    _ => (),
                }

                for command in key_commands(&logical_key, text.as_deref()) {
                    self.dispatch(command);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.click(),
            WindowEvent::Resized(size) => {
                if let Some(pixels) = &mut self.pixels
                    && let Err(e) = pixels.resize_surface(size.width, size.height)
                {
                    log::error!("Resizing surface failed: {:?}", e);
                }
            }
            WindowEvent::RedrawRequested => {
                self.draw();
            }
            _ => (),
        }
    }
}
