//! Progress value and the circular dial it maps onto
//!
//! Progress runs from -0.5 (nothing elapsed, full ring) to 1.5 (everything
//! elapsed, empty ring). Multiplied by π it is the end angle of the arc,
//! which starts at 1.5π and is drawn anticlockwise.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub const PROGRESS_FULL: f64 = -0.5;
pub const PROGRESS_EMPTY: f64 = 1.5;
pub const ARC_START_ANGLE: f64 = 1.5 * PI;

/// Progress for a run of `initial_ms` with `remaining_ms` left
pub fn progress(initial_ms: u64, remaining_ms: u64) -> f64 {
    if initial_ms == 0 {
        return PROGRESS_EMPTY;
    }
    let elapsed = initial_ms.saturating_sub(remaining_ms) as f64;
    (elapsed / initial_ms as f64) * 2.0 - 0.5
}

/// Share of the ring still drawn, 1.0 when full
pub fn remaining_fraction(progress: f64) -> f64 {
    ((PROGRESS_EMPTY - progress) / 2.0).clamp(0.0, 1.0)
}

/// Stroke colour, linear from green to red
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Rgb {
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let channel = |value: f64| value.clamp(0.0, 255.0).round() as u8;
        (channel(self.red), channel(self.green), channel(self.blue))
    }

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Everything needed to draw the ring for one progress value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialArc {
    pub start_angle: f64,
    pub end_angle: f64,
    pub anticlockwise: bool,
    pub color: Rgb,
}

impl DialArc {
    pub fn from_progress(progress: f64) -> Self {
        let ratio = (progress + 0.5) / 2.0;
        Self {
            start_angle: ARC_START_ANGLE,
            end_angle: progress * PI,
            anticlockwise: true,
            color: Rgb {
                red: 255.0 * ratio,
                green: 255.0 * (1.0 - ratio),
                blue: 0.0,
            },
        }
    }
}
