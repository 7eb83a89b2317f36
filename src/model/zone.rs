use glam::Vec3;

use crate::controller::animation::{Easing, Repeat, Tween};
use crate::model::camera::Ray;

/// Messages shown when a zone is clicked, keyed by zone tag
const ZONE_MESSAGES: &[(&str, &str)] = &[
    ("about", "Hello! I'm a web developer."),
    ("projects", "Check out the projects I've built!"),
    ("contact", "Contact: your-email@example.com"),
];

pub const FALLBACK_MESSAGE: &str = "Portfolio information";

pub fn message_for_tag(tag: &str) -> &'static str {
    ZONE_MESSAGES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, message)| *message)
        .unwrap_or(FALLBACK_MESSAGE)
}

/// Position + scale of a zone after cosmetic animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub scale: Vec3,
}

/// Click feedback: a bounce and a scale pulse that revert on their own
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightState {
    Idle,
    Highlighted {
        started_at: f64,
        position: Tween,
        scale: Tween,
    },
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    /// Slab test; returns the entry distance along the ray
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir.abs() < 1e-8 {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// Interactive portfolio block
#[derive(Debug, Clone)]
pub struct Zone {
    pub tag: String,
    pub position: Vec3,
    pub size: Vec3,
    pub color: [f32; 4],
    pub pose: Pose,
    idle_position: Tween,
    idle_scale: Tween,
    pub highlight: HighlightState,
}

impl Zone {
    /// `index` staggers the idle float so zones drift out of phase
    pub fn new(tag: &str, position: Vec3, size: Vec3, color: [f32; 4], index: usize) -> Self {
        let i = index as f32;
        let idle_position = Tween::new(
            0.0,
            3.0 + i * 0.5,
            position,
            Vec3::new(position.x, 0.1 + i.sin() * 0.05, position.z),
            Easing::Power2InOut,
            Repeat::YoyoForever,
        );
        let idle_scale = Tween::new(
            0.0,
            4.0 + i * 0.3,
            Vec3::ONE,
            Vec3::new(1.0 + (i * 2.0).sin() * 0.02, 1.0, 1.0 + (i * 2.0).cos() * 0.02),
            Easing::Power1InOut,
            Repeat::YoyoForever,
        );
        Self {
            tag: tag.to_string(),
            position,
            size,
            color,
            pose: Pose { position, scale: Vec3::ONE },
            idle_position,
            idle_scale,
            highlight: HighlightState::Idle,
        }
    }

    /// Logical bounds used for picking; cosmetic animation does not move them
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self.highlight, HighlightState::Highlighted { .. })
    }

    /// Start (or restart) the click highlight from the current pose
    pub fn trigger_highlight(&mut self, now: f64) {
        let from = self.pose;
        self.highlight = HighlightState::Highlighted {
            started_at: now,
            position: Tween::new(
                now,
                0.3,
                from.position,
                Vec3::new(from.position.x, 0.3, from.position.z),
                Easing::BackOut(1.7),
                Repeat::Yoyo(1),
            ),
            scale: Tween::new(now, 0.2, from.scale, Vec3::new(1.1, 2.0, 1.1), Easing::Power2Out, Repeat::Yoyo(1)),
        };
    }

    /// Advance idle and highlight animation to `now`
    pub fn animate(&mut self, now: f64) {
        let mut pose = Pose {
            position: self.idle_position.sample(now),
            scale: self.idle_scale.sample(now),
        };

        if let HighlightState::Highlighted { position, scale, .. } = &self.highlight {
            if position.is_finished(now) && scale.is_finished(now) {
                self.highlight = HighlightState::Idle;
            } else {
                if !position.is_finished(now) {
                    pose.position = position.sample(now);
                }
                if !scale.is_finished(now) {
                    pose.scale = scale.sample(now);
                }
            }
        }

        self.pose = pose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projects_zone() -> Zone {
        Zone::new("projects", Vec3::new(0.0, 0.1, 0.0), Vec3::new(12.0, 0.2, 6.0), [0.2, 0.6, 0.86, 1.0], 1)
    }

    #[test]
    fn known_tags_resolve_and_unknown_fall_back() {
        assert_eq!(message_for_tag("projects"), "Check out the projects I've built!");
        assert_eq!(message_for_tag("about"), "Hello! I'm a web developer.");
        assert_eq!(message_for_tag("blog"), FALLBACK_MESSAGE);
    }

    #[test]
    fn ray_straight_down_hits_top_face() {
        let zone = projects_zone();
        let ray = Ray { origin: Vec3::new(1.0, 10.0, 1.0), direction: Vec3::NEG_Y };
        let t = zone.bounds().intersect(&ray).unwrap();
        assert!((t - 9.8).abs() < 1e-4);
    }

    #[test]
    fn ray_beside_zone_misses() {
        let zone = projects_zone();
        let ray = Ray { origin: Vec3::new(7.0, 10.0, 0.0), direction: Vec3::NEG_Y };
        assert!(zone.bounds().intersect(&ray).is_none());
        let away = Ray { origin: Vec3::new(0.0, 10.0, 0.0), direction: Vec3::Y };
        assert!(zone.bounds().intersect(&away).is_none());
    }

    #[test]
    fn highlight_runs_then_reverts_to_idle() {
        let mut zone = projects_zone();
        zone.animate(1.0);
        zone.trigger_highlight(1.0);
        assert!(zone.is_highlighted());

        zone.animate(1.2);
        assert!(zone.pose.scale.y > 1.5);
        zone.animate(1.3);
        assert!(zone.pose.position.y > 0.25);

        zone.animate(1.61);
        assert!(!zone.is_highlighted());
        assert!(zone.pose.scale.y < 1.01);
    }

    #[test]
    fn retrigger_restarts_the_timer() {
        let mut zone = projects_zone();
        zone.trigger_highlight(0.0);
        zone.animate(0.5);
        zone.trigger_highlight(0.5);
        zone.animate(0.9);
        assert!(zone.is_highlighted());
        match &zone.highlight {
            HighlightState::Highlighted { started_at, .. } => assert_eq!(*started_at, 0.5),
            HighlightState::Idle => panic!("expected highlight"),
        }
    }

    #[test]
    fn idle_animation_leaves_bounds_alone() {
        let mut zone = projects_zone();
        let before = zone.bounds();
        zone.animate(2.3);
        zone.trigger_highlight(2.3);
        zone.animate(2.5);
        assert_eq!(zone.bounds(), before);
    }
}
