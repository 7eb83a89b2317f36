// Re-export all public modules so they can be used from main.rs
pub mod error;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::{
    clock::PerformanceClock,
    input::wasm as web_input,
    FrameLoop, FrameLoopSettings, InputEvent, LoopHandle, MouseButton,
};
#[cfg(target_arch = "wasm32")]
use error::InitError;
#[cfg(target_arch = "wasm32")]
use model::Scene;
#[cfg(target_arch = "wasm32")]
use ui::MessageOverlay;
#[cfg(target_arch = "wasm32")]
use view::{render::physical_size, GpuContext, SceneRenderer};

#[cfg(target_arch = "wasm32")]
type WebFrameLoop = FrameLoop<PerformanceClock>;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let (window, document, canvas) = init_canvas()?;
    setup_app(window, document, canvas).await?;
    Ok(())
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(window: Window, document: Document, canvas: HtmlCanvasElement) -> Result<(), InitError> {
    let settings = FrameLoopSettings::default();
    let (width, height) = window_size(&window);
    let pixel_ratio = (window.device_pixel_ratio() as f32).min(settings.max_pixel_ratio);
    let (physical_width, physical_height) = physical_size(width, height, pixel_ratio);
    canvas.set_width(physical_width);
    canvas.set_height(physical_height);

    let gpu = GpuContext::new(&canvas, physical_width, physical_height).await?;
    tracing::info!(width, height, pixel_ratio, "GPU initialized");

    let overlay = Rc::new(RefCell::new(MessageOverlay::new()));
    let renderer = Rc::new(RefCell::new(SceneRenderer::new(
        gpu,
        width,
        height,
        pixel_ratio,
        overlay.clone(),
    )));
    let frame_loop = Rc::new(RefCell::new(FrameLoop::new(
        Scene::portfolio(),
        PerformanceClock::new(&window),
        width,
        height,
    )));

    setup_input_listeners(&window, &document, &canvas, &frame_loop, &renderer, &overlay)?;

    let handle = frame_loop.borrow().handle();
    AnimationLoop::new(window, handle, move || {
        frame_loop.borrow_mut().tick(&mut *renderer.borrow_mut());
    })
    .start();

    tracing::info!("portfolio scene running");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn window_size(window: &Window) -> (u32, u32) {
    let dimension = |value: Result<JsValue, JsValue>, fallback: f64| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(fallback).max(1.0) as u32
    };
    (dimension(window.inner_width(), 800.0), dimension(window.inner_height(), 600.0))
}

#[cfg(target_arch = "wasm32")]
fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
    if let Err(e) = canvas.style().set_property("cursor", cursor) {
        tracing::warn!(?e, "failed to set cursor");
    }
}

/// Setup all input event listeners with platform-agnostic abstractions
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    frame_loop: &Rc<RefCell<WebFrameLoop>>,
    renderer: &Rc<RefCell<SceneRenderer>>,
    overlay: &Rc<RefCell<MessageOverlay>>,
) -> Result<(), InitError> {
    let input_state = frame_loop.borrow().input.clone();

    // Keyboard down
    {
        let input_state = input_state.clone();
        let overlay = overlay.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let code = e.code();
            if overlay.borrow_mut().handle_key(&code) {
                e.prevent_default();
                return;
            }
            if code.starts_with("Arrow") {
                e.prevent_default();
            }
            input_state
                .borrow_mut()
                .process_event(&web_input::keyboard_event_to_input(&e, true));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input_state = input_state.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            input_state
                .borrow_mut()
                .process_event(&web_input::keyboard_event_to_input(&e, false));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - clear all keys
    {
        let input_state = input_state.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().process_event(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change - clear all keys
    {
        let input_state = input_state.clone();
        let document_for_visibility = document.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            let visible = !document_for_visibility.hidden();
            input_state
                .borrow_mut()
                .process_event(&InputEvent::VisibilityChanged { visible });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Mouse down on the canvas starts a drag, unless the message is up
    {
        let input_state = input_state.clone();
        let overlay = overlay.clone();
        let canvas_for_cursor = canvas.clone();
        let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
            let event = web_input::mouse_down_to_input(&e);
            let mut overlay = overlay.borrow_mut();
            if overlay.is_open() {
                overlay.push_event(pointer_button(&e, true));
                return;
            }
            if matches!(event, InputEvent::MouseDown { button: MouseButton::Left, .. }) {
                set_cursor(&canvas_for_cursor, "grabbing");
            }
            input_state.borrow_mut().process_event(&event);
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }

    // Mouse up anywhere ends the drag
    {
        let input_state = input_state.clone();
        let overlay = overlay.clone();
        let canvas_for_cursor = canvas.clone();
        let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
            let event = web_input::mouse_up_to_input(&e);
            if matches!(event, InputEvent::MouseUp { button: MouseButton::Left }) {
                set_cursor(&canvas_for_cursor, "grab");
            }
            input_state.borrow_mut().process_event(&event);
            overlay.borrow_mut().push_event(pointer_button(&e, false));
        }) as Box<dyn FnMut(MouseEvent)>);
        window.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }

    // Mouse move orbits while dragging and feeds the overlay pointer
    {
        let input_state = input_state.clone();
        let overlay = overlay.clone();
        let mousemove = Closure::wrap(Box::new(move |e: MouseEvent| {
            input_state
                .borrow_mut()
                .process_event(&web_input::mouse_move_to_input(&e));
            overlay
                .borrow_mut()
                .push_event(egui::Event::PointerMoved(egui::pos2(e.client_x() as f32, e.client_y() as f32)));
        }) as Box<dyn FnMut(MouseEvent)>);
        window.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }

    // Mouse wheel zooms
    {
        let input_state = input_state.clone();
        let wheel = Closure::wrap(Box::new(move |e: Event| {
            if let Some(event) = web_input::mouse_wheel_to_input(&e) {
                input_state.borrow_mut().process_event(&event);
                e.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>);
        canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
        wheel.forget();
    }

    // Click picks a zone and opens its message
    {
        let frame_loop = frame_loop.clone();
        let overlay = overlay.clone();
        let click = Closure::wrap(Box::new(move |e: MouseEvent| {
            if overlay.borrow().is_open() {
                return;
            }
            let button = MouseButton::from_web_button(e.button());
            let hit = frame_loop
                .borrow_mut()
                .click(button, e.client_x() as f32, e.client_y() as f32);
            if let Some(hit) = hit {
                overlay.borrow_mut().show(hit.message);
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        click.forget();
    }

    // Context menu prevention
    {
        let contextmenu = Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
        contextmenu.forget();
    }

    // Window resize keeps the canvas full-window
    {
        let frame_loop = frame_loop.clone();
        let renderer = renderer.clone();
        let canvas_for_resize = canvas.clone();
        let window_for_resize = window.clone();
        let resize = Closure::wrap(Box::new(move |_e: Event| {
            let (width, height) = window_size(&window_for_resize);
            let device_pixel_ratio = window_for_resize.device_pixel_ratio() as f32;
            let mut frame_loop = frame_loop.borrow_mut();
            let capped = device_pixel_ratio.min(frame_loop.settings.max_pixel_ratio);
            let (physical_width, physical_height) = physical_size(width, height, capped);
            canvas_for_resize.set_width(physical_width);
            canvas_for_resize.set_height(physical_height);
            frame_loop.resize(width, height, device_pixel_ratio, &mut *renderer.borrow_mut());
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn pointer_button(e: &MouseEvent, pressed: bool) -> egui::Event {
    egui::Event::PointerButton {
        pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
        button: egui::PointerButton::Primary,
        pressed,
        modifiers: egui::Modifiers::default(),
    }
}

/// Full-window canvas attached to the body
#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), InitError> {
    let window = web_sys::window().ok_or(InitError::NoWindow)?;
    let document = window.document().ok_or(InitError::NoDocument)?;
    let body = document.body().ok_or(InitError::NoBody)?;
    body.style().set_property("margin", "0")?;
    body.style().set_property("overflow", "hidden")?;

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| InitError::CanvasCreation)?;
    let style = canvas.style();
    style.set_property("display", "block")?;
    style.set_property("width", "100vw")?;
    style.set_property("height", "100vh")?;
    style.set_property("cursor", "grab")?;
    body.append_child(&canvas)?;
    Ok((window, document, canvas))
}

/// requestAnimationFrame driver that stops rescheduling once the handle is cancelled
#[cfg(target_arch = "wasm32")]
struct AnimationLoop {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
    handle: LoopHandle,
}

#[cfg(target_arch = "wasm32")]
impl AnimationLoop {
    fn new(window: Window, handle: LoopHandle, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
            handle,
        }
    }

    fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();
        let handle = self.handle.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if handle.is_cancelled() {
                tracing::info!("frame loop stopped");
                return;
            }
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(?e, "requestAnimationFrame failed");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                tracing::error!(?e, "requestAnimationFrame failed to start");
            }
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
    }
}
