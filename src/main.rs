use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorIcon, Window},
};

// Import from the library crate
use folio3d::{
    controller::{clock::InstantClock, FrameLoop, InputEvent, MouseButton, SteppedClock},
    logging,
    model::Scene,
    ui::MessageOverlay,
    view::{GpuContext, NullRenderer, SceneRenderer},
};

/// Walkable 3D portfolio page
#[derive(Parser, Debug)]
#[command(name = "folio3d", version, about)]
struct Args {
    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Simulate without a window or GPU
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Key codes held for the whole headless run, e.g. `--hold KeyW --hold KeyD`
    #[arg(long)]
    hold: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();
    tracing::info!(?args, "starting folio3d");

    if args.headless {
        run_headless(&args);
        Ok(())
    } else {
        run_windowed(&args)
    }
}

fn run_headless(args: &Args) {
    let mut frame_loop = FrameLoop::new(Scene::portfolio(), SteppedClock::new(1.0 / 60.0), args.width, args.height);
    {
        let mut input = frame_loop.input.borrow_mut();
        for code in &args.hold {
            if !input.set_key(code, true) {
                tracing::warn!(%code, "ignoring key that does not move the avatar");
            }
        }
    }

    let mut renderer = NullRenderer::default();
    let handle = frame_loop.handle();
    let target = args.frames;
    if target == 0 {
        handle.cancel();
    }
    frame_loop.run(&mut renderer, |frame_loop| {
        if frame_loop.frames() >= target {
            handle.cancel();
        }
    });

    let avatar = &frame_loop.scene.avatar;
    tracing::info!(
        frames = frame_loop.frames(),
        position = ?avatar.position,
        rotation = ?avatar.quaternion,
        "headless run finished"
    );
}

#[allow(deprecated)]
fn run_windowed(args: &Args) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window_attributes = Window::default_attributes()
        .with_title("folio3d")
        .with_inner_size(LogicalSize::new(args.width, args.height));
    let window = Arc::new(
        event_loop
            .create_window(window_attributes)
            .context("failed to create window")?,
    );

    let size = window.inner_size();
    let scale_factor = window.scale_factor();
    let logical = size.to_logical::<u32>(scale_factor);
    let gpu = pollster::block_on(GpuContext::new_native(window.clone(), size.width, size.height))
        .context("GPU initialization failed")?;
    tracing::info!(width = logical.width, height = logical.height, scale_factor, "GPU initialized");

    let overlay = Rc::new(RefCell::new(MessageOverlay::new()));
    let mut renderer = SceneRenderer::new(gpu, logical.width, logical.height, scale_factor as f32, overlay.clone());
    renderer.set_surface_size(size.width, size.height);
    let mut frame_loop = FrameLoop::new(Scene::portfolio(), InstantClock::new(), logical.width, logical.height);
    frame_loop.resize(logical.width, logical.height, scale_factor as f32, &mut renderer);

    let mut egui_state = egui_winit::State::new(
        overlay.borrow().ctx().clone(),
        egui::ViewportId::ROOT,
        &window,
        None,
        None,
        None,
    );
    window.set_cursor(CursorIcon::Grab);
    let mut cursor = (0.0_f32, 0.0_f32);

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { ref event, window_id } if window_id == window.id() => {
                if egui_state.on_window_event(&window, event).consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        frame_loop.handle().cancel();
                        tracing::info!(frames = frame_loop.frames(), "window closed");
                        elwt.exit();
                    }
                    WindowEvent::Resized(physical_size) => {
                        let scale_factor = window.scale_factor();
                        let logical = physical_size.to_logical::<u32>(scale_factor);
                        renderer.set_surface_size(physical_size.width, physical_size.height);
                        frame_loop.resize(logical.width.max(1), logical.height.max(1), scale_factor as f32, &mut renderer);
                    }
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        let physical_size = window.inner_size();
                        let logical = physical_size.to_logical::<u32>(*scale_factor);
                        renderer.set_surface_size(physical_size.width, physical_size.height);
                        frame_loop.resize(logical.width.max(1), logical.height.max(1), *scale_factor as f32, &mut renderer);
                    }
                    WindowEvent::KeyboardInput {
                        event: KeyEvent { physical_key: PhysicalKey::Code(code), state, .. },
                        ..
                    } => {
                        let Some(dom_code) = dom_code(*code) else {
                            return;
                        };
                        let pressed = *state == ElementState::Pressed;
                        if pressed && overlay.borrow_mut().handle_key(dom_code) {
                            return;
                        }
                        let event = if pressed {
                            InputEvent::KeyDown(dom_code.to_string())
                        } else {
                            InputEvent::KeyUp(dom_code.to_string())
                        };
                        frame_loop.input.borrow_mut().process_event(&event);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let position = position.to_logical::<f32>(window.scale_factor());
                        cursor = (position.x, position.y);
                        frame_loop
                            .input
                            .borrow_mut()
                            .process_event(&InputEvent::MouseMove { x: cursor.0, y: cursor.1 });
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        let button = mouse_button(*button);
                        match state {
                            ElementState::Pressed => {
                                if overlay.borrow().is_open() {
                                    return;
                                }
                                if button == MouseButton::Left {
                                    window.set_cursor(CursorIcon::Grabbing);
                                }
                                frame_loop.input.borrow_mut().process_event(&InputEvent::MouseDown {
                                    button,
                                    x: cursor.0,
                                    y: cursor.1,
                                });
                            }
                            ElementState::Released => {
                                if button == MouseButton::Left {
                                    window.set_cursor(CursorIcon::Grab);
                                }
                                frame_loop
                                    .input
                                    .borrow_mut()
                                    .process_event(&InputEvent::MouseUp { button });

                                // A release completes a click, like the browser's click event
                                if !overlay.borrow().is_open() {
                                    if let Some(hit) = frame_loop.click(button, cursor.0, cursor.1) {
                                        overlay.borrow_mut().show(hit.message);
                                    }
                                }
                            }
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let delta_y = match delta {
                            MouseScrollDelta::LineDelta(_, y) => -y * 100.0,
                            MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                        };
                        frame_loop
                            .input
                            .borrow_mut()
                            .process_event(&InputEvent::MouseWheel { delta_y });
                    }
                    WindowEvent::Focused(false) => {
                        frame_loop.input.borrow_mut().process_event(&InputEvent::FocusLost);
                    }
                    WindowEvent::Occluded(occluded) => {
                        frame_loop
                            .input
                            .borrow_mut()
                            .process_event(&InputEvent::VisibilityChanged { visible: !occluded });
                    }
                    WindowEvent::RedrawRequested => {
                        let raw_input = egui_state.take_egui_input(&window);
                        overlay.borrow_mut().set_input(raw_input);
                        frame_loop.tick(&mut renderer);
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .context("event loop failed")?;

    Ok(())
}

/// Browser `KeyboardEvent.code` name for the keys the scene reacts to
fn dom_code(code: KeyCode) -> Option<&'static str> {
    Some(match code {
        KeyCode::KeyW => "KeyW",
        KeyCode::KeyA => "KeyA",
        KeyCode::KeyS => "KeyS",
        KeyCode::KeyD => "KeyD",
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",
        KeyCode::Enter => "Enter",
        KeyCode::NumpadEnter => "NumpadEnter",
        KeyCode::Escape => "Escape",
        _ => return None,
    })
}

fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(id) => MouseButton::Other(id as i16),
    }
}
