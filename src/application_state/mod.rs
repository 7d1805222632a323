//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling and cursor capture
//! - Application lifecycle events
//!
//! Each `about_to_wait` drives one engine tick (input, streaming, edits, upload) and
//! requests a redraw; the frame itself is drawn on `RedrawRequested`.

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, MaybeGraphics};
use input_manager::InputManager;
use log::warn;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    core::{fatal, EngineConfig},
    engine_state::EngineState,
};

/// The main application state container that manages the application's lifecycle.
///
/// Implements `ApplicationHandler` to route window and device events into the engine.
pub struct ApplicationState {
    /// Graphics initialization progress
    pub graphics: MaybeGraphics,

    /// Configuration handed to the engine once graphics are ready
    pub config: EngineConfig,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core game engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

impl ApplicationState {
    pub fn new(graphics: MaybeGraphics, config: EngineConfig) -> Self {
        Self {
            graphics,
            config,
            state: None,
        }
    }
}

impl InitializedApplicationState {
    /// Grabs or releases the cursor to match the engine's lock state.
    fn apply_cursor_lock(&self) {
        let locked = self.engine_state.cursor_locked();
        let grab = if locked {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };

        if let Err(err) = grab {
            warn!("Could not change cursor grab: {}", err);
        }
        self.window.set_cursor_visible(!locked);
    }
}

fn is_exit_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    /// * `_window_id` - ID of the window that generated the event
    /// * `event` - The window event to process
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if is_exit_request(&event) {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        state.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.engine_state.resize_surface(size);
            }
            WindowEvent::Focused(false) => {
                state.input_manager.release_all();
            }
            WindowEvent::RedrawRequested => {
                let size = state.window.inner_size();
                state.engine_state.render(size);
            }
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Starts graphics initialization on the first resume.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the initialized graphics and builds the engine around them.
    ///
    /// World population happens here and blocks until the starting area is uploaded.
    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        let Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
        } = graphics;

        let engine_state =
            EngineState::new(surface, surface_config, device, queue, self.config.clone())
                .unwrap_or_else(|err| fatal(err));

        self.state = Some(InitializedApplicationState {
            engine_state,
            window,
            input_manager: InputManager::new(),
            last_wait_time: web_time::Instant::now(),
        });
        self.graphics = MaybeGraphics::Moved;
    }

    /// Runs one engine tick and requests the next frame.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let now = web_time::Instant::now();
            let wait_dt = now - state.last_wait_time;
            state.last_wait_time = now;

            let processed_input = state.input_manager.get_and_reset_processed_input();
            state.engine_state.set_input_commands(processed_input);

            if state.engine_state.process_input(wait_dt) {
                state.apply_cursor_lock();
            }
            state.engine_state.update();

            state.window.request_redraw();
        }
    }
}
