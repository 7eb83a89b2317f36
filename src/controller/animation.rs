use glam::Vec3;

/// Easing curves used by the zone animations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// Quadratic in-out
    Power1InOut,
    /// Cubic in-out
    Power2InOut,
    /// Cubic out
    Power2Out,
    /// Overshoots the target by the given amount before settling
    BackOut(f32),
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
            Easing::BackOut(s) => {
                let u = t - 1.0;
                1.0 + (s + 1.0) * u * u * u + s * u * u
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Repeat {
    Once,
    /// Play forward, then alternate direction for `n` more iterations
    Yoyo(u32),
    YoyoForever,
}

/// Time-keyed interpolation between two vectors
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub start_time: f64,
    pub duration: f32,
    pub from: Vec3,
    pub to: Vec3,
    pub easing: Easing,
    pub repeat: Repeat,
}

impl Tween {
    pub fn new(start_time: f64, duration: f32, from: Vec3, to: Vec3, easing: Easing, repeat: Repeat) -> Self {
        Self { start_time, duration, from, to, easing, repeat }
    }

    fn iterations(&self) -> Option<u32> {
        match self.repeat {
            Repeat::Once => Some(1),
            Repeat::Yoyo(n) => Some(n + 1),
            Repeat::YoyoForever => None,
        }
    }

    pub fn is_finished(&self, now: f64) -> bool {
        match self.iterations() {
            Some(n) => now - self.start_time >= (self.duration as f64) * n as f64,
            None => false,
        }
    }

    pub fn sample(&self, now: f64) -> Vec3 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let elapsed = (now - self.start_time).max(0.0);
        let duration = self.duration as f64;
        let mut iteration = (elapsed / duration).floor() as u64;
        let mut local = ((elapsed - iteration as f64 * duration) / duration) as f32;

        if let Some(n) = self.iterations() {
            if iteration >= n as u64 {
                iteration = n as u64 - 1;
                local = 1.0;
            }
        }

        // Odd iterations of a yoyo play backward
        let backward = self.repeat != Repeat::Once && iteration % 2 == 1;
        let progress = if backward { 1.0 - local } else { local };
        self.from.lerp(self.to, self.easing.apply(progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easings_hit_their_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::Power1InOut,
            Easing::Power2InOut,
            Easing::Power2Out,
            Easing::BackOut(1.7),
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?}");
        }
    }

    #[test]
    fn back_out_overshoots() {
        let peak = (1..100).map(|i| Easing::BackOut(1.7).apply(i as f32 / 100.0)).fold(0.0, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn once_holds_at_target() {
        let tween = Tween::new(1.0, 0.5, Vec3::ZERO, Vec3::ONE, Easing::Linear, Repeat::Once);
        assert_eq!(tween.sample(0.0), Vec3::ZERO);
        assert!((tween.sample(1.25) - Vec3::splat(0.5)).length() < 1e-5);
        assert_eq!(tween.sample(9.0), Vec3::ONE);
        assert!(tween.is_finished(1.5));
        assert!(!tween.is_finished(1.49));
    }

    #[test]
    fn yoyo_returns_to_start() {
        let tween = Tween::new(0.0, 0.3, Vec3::new(0.0, 0.1, 0.0), Vec3::new(0.0, 0.3, 0.0), Easing::BackOut(1.7), Repeat::Yoyo(1));
        assert!((tween.sample(0.3).y - 0.3).abs() < 1e-5);
        assert!((tween.sample(0.6).y - 0.1).abs() < 1e-5);
        assert!(tween.is_finished(0.6));
    }

    #[test]
    fn yoyo_forever_keeps_oscillating() {
        let tween = Tween::new(0.0, 1.0, Vec3::ZERO, Vec3::X, Easing::Linear, Repeat::YoyoForever);
        assert!((tween.sample(10.25).x - 0.25).abs() < 1e-4);
        assert!((tween.sample(11.25).x - 0.75).abs() < 1e-4);
        assert!(!tween.is_finished(1.0e6));
    }
}
