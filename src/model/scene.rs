use glam::{Quat, Vec3};

use crate::model::zone::Zone;

/// Convert a `#rrggbb` literal into RGBA floats
pub const fn hex_color(rgb: u32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

pub const CLEAR_COLOR: [f32; 4] = hex_color(0xf8f8f8);
pub const FOG_COLOR: [f32; 4] = hex_color(0xf5f5f5);
pub const FOG_NEAR: f32 = 40.0;
pub const FOG_FAR: f32 = 120.0;

pub const PLAYER_START: Vec3 = Vec3::new(0.0, 1.0, 20.0);
pub const PLAYER_RADIUS: f32 = 0.2;
pub const PLAYER_MASS: f32 = 1.0;

/// Non-interactive box decorating the page (title, text lines, margins, dividers)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub position: Vec3,
    pub size: Vec3,
    pub color: [f32; 4],
}

/// Visual stand-in for the player, synced from physics each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Avatar {
    pub position: Vec3,
    pub quaternion: Quat,
    pub radius: f32,
    pub color: [f32; 4],
}

pub struct Lighting {
    pub ambient: f32,
    pub sun_position: Vec3,
    pub sun_intensity: f32,
}

/// Everything the renderer draws
pub struct Scene {
    pub floor_size: f32,
    pub floor_color: [f32; 4],
    pub decor: Vec<Block>,
    pub zones: Vec<Zone>,
    pub avatar: Avatar,
    pub lighting: Lighting,
    /// Loop clock reading of the last `animate_zones` call, in seconds
    pub time: f64,
}

impl Scene {
    /// The document-like portfolio page
    pub fn portfolio() -> Self {
        let zones = vec![
            Zone::new("about", Vec3::new(0.0, 0.1, 15.0), Vec3::new(8.0, 0.2, 4.0), hex_color(0xe74c3c), 0),
            Zone::new("projects", Vec3::new(0.0, 0.1, 0.0), Vec3::new(12.0, 0.2, 6.0), hex_color(0x3498db), 1),
            Zone::new("contact", Vec3::new(0.0, 0.1, -15.0), Vec3::new(8.0, 0.2, 3.0), hex_color(0x27ae60), 2),
        ];

        let mut decor = Vec::new();

        // Text lines under each section
        let text_line = |z: f32| Block {
            position: Vec3::new(0.0, 0.05, z),
            size: Vec3::new(10.0, 0.1, 0.5),
            color: hex_color(0x7f8c8d),
        };
        decor.extend((0..3).map(|i| text_line(12.0 - i as f32)));
        decor.extend((0..5).map(|i| text_line(3.0 - i as f32)));
        decor.extend((0..2).map(|i| text_line(-12.0 - i as f32)));

        // Title
        decor.push(Block {
            position: Vec3::new(0.0, 0.15, 22.0),
            size: Vec3::new(15.0, 0.3, 2.0),
            color: hex_color(0x2c3e50),
        });

        // Margins
        for x in [-18.0, 18.0] {
            decor.push(Block {
                position: Vec3::new(x, 0.025, 0.0),
                size: Vec3::new(0.2, 0.05, 50.0),
                color: hex_color(0xbdc3c7),
            });
        }

        // Section dividers
        for z in [8.0, -8.0] {
            decor.push(Block {
                position: Vec3::new(0.0, 0.025, z),
                size: Vec3::new(16.0, 0.05, 0.2),
                color: hex_color(0x95a5a6),
            });
        }

        Self {
            floor_size: 100.0,
            floor_color: hex_color(0xffffff),
            decor,
            zones,
            avatar: Avatar {
                position: PLAYER_START,
                quaternion: Quat::IDENTITY,
                radius: PLAYER_RADIUS,
                color: hex_color(0x2c3e50),
            },
            lighting: Lighting {
                ambient: 0.8,
                sun_position: Vec3::new(10.0, 20.0, 10.0),
                sun_intensity: 0.6,
            },
            time: 0.0,
        }
    }

    pub fn animate_zones(&mut self, now: f64) {
        self.time = now;
        for zone in &mut self.zones {
            zone.animate(now);
        }
    }
}
