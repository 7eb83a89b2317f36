use egui::Context;

/// Modal message shown after a zone click. At most one is open at a time.
pub struct MessageOverlay {
    ctx: Context,
    message: Option<String>,
    /// Full input prepared by the host (egui-winit on native)
    pending_input: Option<egui::RawInput>,
    /// Loose events queued by the browser listeners
    events: Vec<egui::Event>,
}

impl Default for MessageOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageOverlay {
    pub fn new() -> Self {
        Self {
            ctx: Context::default(),
            message: None,
            pending_input: None,
            events: Vec::new(),
        }
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    /// Open the overlay, replacing whatever it showed before
    pub fn show(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "showing message");
        self.message = Some(message);
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn is_open(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_input(&mut self, raw_input: egui::RawInput) {
        self.pending_input = Some(raw_input);
    }

    pub fn push_event(&mut self, event: egui::Event) {
        self.events.push(event);
    }

    /// Handle a key by its DOM code. Returns true if the overlay consumed it.
    pub fn handle_key(&mut self, code: &str) -> bool {
        if self.is_open() && matches!(code, "Enter" | "NumpadEnter" | "Escape") {
            self.dismiss();
            return true;
        }
        false
    }

    /// Run one egui pass over the queued input. `screen_size` is in points.
    pub fn run(&mut self, screen_size: egui::Vec2, pixels_per_point: f32, time: f64) -> egui::FullOutput {
        let mut raw_input = self.pending_input.take().unwrap_or_default();
        if raw_input.screen_rect.is_none() {
            raw_input.screen_rect = Some(egui::Rect::from_min_size(egui::Pos2::ZERO, screen_size));
        }
        raw_input.time = Some(time);
        raw_input.events.append(&mut self.events);

        self.ctx.set_pixels_per_point(pixels_per_point);
        let ctx = self.ctx.clone();
        let message = &mut self.message;
        ctx.run(raw_input, |ctx| draw_message_window(ctx, message))
    }
}

fn draw_message_window(ctx: &Context, message: &mut Option<String>) {
    let Some(text) = message.as_deref() else {
        return;
    };

    let mut close = false;
    egui::Window::new("Portfolio")
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(text);
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    close = true;
                }
            });
        });

    if close {
        *message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_replaces_the_open_message() {
        let mut overlay = MessageOverlay::new();
        overlay.show("About Me section");
        overlay.show("Contact Information section");
        assert_eq!(overlay.message(), Some("Contact Information section"));
    }

    #[test]
    fn enter_and_escape_dismiss() {
        let mut overlay = MessageOverlay::new();
        assert!(!overlay.handle_key("Escape"));
        overlay.show("x");
        assert!(!overlay.handle_key("KeyW"));
        assert!(overlay.handle_key("Enter"));
        assert!(!overlay.is_open());
    }

    #[test]
    fn running_keeps_message_without_interaction() {
        let mut overlay = MessageOverlay::new();
        overlay.show("Projects Portfolio section");
        overlay.run(egui::vec2(800.0, 600.0), 1.0, 0.0);
        overlay.run(egui::vec2(800.0, 600.0), 1.0, 0.1);
        assert!(overlay.is_open());
    }

    #[test]
    fn font_atlas_is_handed_out_only_once() {
        let mut overlay = MessageOverlay::new();
        let first = overlay.run(egui::vec2(800.0, 600.0), 1.0, 0.0);
        assert!(!first.textures_delta.set.is_empty());

        // A renderer that drops this output can never get the atlas back
        let second = overlay.run(egui::vec2(800.0, 600.0), 1.0, 0.1);
        assert!(second.textures_delta.set.is_empty());
    }
}
