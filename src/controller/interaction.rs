use glam::Vec2;

use crate::controller::input::{InputState, MouseButton};
use crate::model::{message_for_tag, Camera, Zone};

/// Result of a click that landed on a zone
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneClick {
    pub index: usize,
    pub tag: String,
    pub message: &'static str,
}

/// Click picking against the zone set
#[derive(Default)]
pub struct InteractionController {
    pub last_click: Option<ZoneClick>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self { last_click: None }
    }

    /// Cursor position in pixels to normalized device coordinates
    pub fn to_ndc(x: f32, y: f32, viewport: (u32, u32)) -> Vec2 {
        let (w, h) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        Vec2::new(x / w * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
    }

    /// Index and distance of the nearest zone under the cursor. On equal
    /// distance the earlier zone wins.
    pub fn pick(camera: &Camera, zones: &[Zone], ndc: Vec2) -> Option<(usize, f32)> {
        let ray = camera.ray_from_ndc(ndc);
        zones
            .iter()
            .enumerate()
            .filter_map(|(i, zone)| zone.bounds().intersect(&ray).map(|t| (i, t)))
            .fold(None, |best: Option<(usize, f32)>, (i, t)| match best {
                Some((_, best_t)) if best_t <= t => best,
                _ => Some((i, t)),
            })
    }

    /// Only a primary click that is not part of a drag picks. A hit starts
    /// the zone highlight and resolves its message.
    #[allow(clippy::too_many_arguments)]
    pub fn on_click(
        &mut self,
        button: MouseButton,
        x: f32,
        y: f32,
        viewport: (u32, u32),
        input: &InputState,
        camera: &Camera,
        zones: &mut [Zone],
        now: f64,
    ) -> Option<ZoneClick> {
        if button != MouseButton::Left || input.is_down {
            return None;
        }

        let ndc = Self::to_ndc(x, y, viewport);
        let (index, _) = Self::pick(camera, zones, ndc)?;
        let zone = &mut zones[index];
        zone.trigger_highlight(now);

        let click = ZoneClick {
            index,
            tag: zone.tag.clone(),
            message: message_for_tag(&zone.tag),
        };
        tracing::info!(tag = %click.tag, "{} section clicked", click.tag);
        self.last_click = Some(click.clone());
        Some(click)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    use crate::model::Scene;

    /// Camera straight above the projects zone
    fn overhead_camera() -> Camera {
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::new(0.0, 30.0, 0.01);
        camera.look_at(Vec3::ZERO);
        camera
    }

    #[test]
    fn ndc_maps_corners_and_center() {
        assert_eq!(InteractionController::to_ndc(400.0, 300.0, (800, 600)), Vec2::ZERO);
        assert_eq!(InteractionController::to_ndc(0.0, 0.0, (800, 600)), Vec2::new(-1.0, 1.0));
        assert_eq!(InteractionController::to_ndc(800.0, 600.0, (800, 600)), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn click_on_projects_resolves_message_and_highlights() {
        let mut scene = Scene::portfolio();
        let mut controller = InteractionController::new();
        let input = InputState::new();
        let camera = overhead_camera();

        let click = controller
            .on_click(MouseButton::Left, 400.0, 300.0, (800, 600), &input, &camera, &mut scene.zones, 2.0)
            .expect("center of the view is on the projects zone");
        assert_eq!(click.tag, "projects");
        assert_eq!(click.message, "Check out the projects I've built!");
        assert!(scene.zones[1].is_highlighted());
        assert!(!scene.zones[0].is_highlighted());
        assert_eq!(controller.last_click, Some(click));
    }

    #[test]
    fn miss_changes_nothing() {
        let mut scene = Scene::portfolio();
        let mut controller = InteractionController::new();
        let input = InputState::new();
        let camera = overhead_camera();

        // Far left of the view lands on bare floor
        let click = controller.on_click(MouseButton::Left, 5.0, 300.0, (800, 600), &input, &camera, &mut scene.zones, 2.0);
        assert!(click.is_none());
        assert!(scene.zones.iter().all(|z| !z.is_highlighted()));
        assert!(controller.last_click.is_none());
    }

    #[test]
    fn clicks_while_dragging_or_with_other_buttons_are_ignored() {
        let mut scene = Scene::portfolio();
        let mut controller = InteractionController::new();
        let camera = overhead_camera();

        let mut dragging = InputState::new();
        dragging.begin_drag(400.0, 300.0);
        assert!(controller
            .on_click(MouseButton::Left, 400.0, 300.0, (800, 600), &dragging, &camera, &mut scene.zones, 0.0)
            .is_none());

        let idle = InputState::new();
        assert!(controller
            .on_click(MouseButton::Right, 400.0, 300.0, (800, 600), &idle, &camera, &mut scene.zones, 0.0)
            .is_none());
        assert!(scene.zones.iter().all(|z| !z.is_highlighted()));
    }

    #[test]
    fn nearest_zone_wins_when_rays_pass_through_several() {
        let zones = vec![
            Zone::new("far", Vec3::new(0.0, 0.1, -10.0), Vec3::new(4.0, 4.0, 1.0), [1.0; 4], 0),
            Zone::new("near", Vec3::new(0.0, 0.1, -5.0), Vec3::new(4.0, 4.0, 1.0), [1.0; 4], 1),
        ];
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::new(0.0, 0.1, 5.0);
        camera.look_at(Vec3::new(0.0, 0.1, 0.0));

        let (index, _) = InteractionController::pick(&camera, &zones, Vec2::ZERO).unwrap();
        assert_eq!(zones[index].tag, "near");
    }
}
