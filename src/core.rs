use crate::error::{ScrawlError, ScrawlResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ScrawlResult<Self> {
        if den == 0 {
            return Err(ScrawlError::config("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ScrawlError::config("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Unit-interval RGB; opacity travels separately on pen/fill state.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RED: Self = Self::new(0.86, 0.2, 0.18);
    pub const BLUE: Self = Self::new(0.16, 0.32, 0.75);
    pub const ORANGE: Self = Self::new(0.92, 0.55, 0.14);
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
