use kurbo::Point;

use crate::core::Color;
use crate::error::{ScrawlError, ScrawlResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StrokePressure {
    #[default]
    Constant,
    Proportional,
    Inverse,
}

/// Styling for the boundary strokes of a primitive.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
    pub pressure: StrokePressure,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            opacity: 1.0,
            pressure: StrokePressure::Constant,
        }
    }
}

impl StrokeStyle {
    pub fn pen(&self) -> Pen {
        Pen {
            color: self.color,
            width: self.width,
            opacity: self.opacity,
            mode: PenMode::Stroke,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FillPattern {
    #[default]
    Hachure,
    ZigZag,
    CrossHatch,
    Solid,
}

/// Styling for the interior fill of a primitive.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FillStyle {
    pub color: Color,
    pub opacity: f64,
    pub pattern: FillPattern,
    pub hachure_angle: f64,
    pub hachure_gap: f64,
    pub hachure_line_width: f64,
    pub zigzag_offset: f64,
    pub fill_weight: f64,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            opacity: 1.0,
            pattern: FillPattern::Hachure,
            hachure_angle: 45.0,
            hachure_gap: 4.0,
            hachure_line_width: 1.0,
            zigzag_offset: -1.0,
            fill_weight: 2.0,
        }
    }
}

impl FillStyle {
    pub fn pen(&self) -> Pen {
        Pen {
            color: self.color,
            width: self.fill_weight,
            opacity: self.opacity,
            mode: PenMode::Fill,
        }
    }
}

/// Knobs for the hand-drawn wobble applied by shape constructors.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SketchStyle {
    pub bowing: f64,
    pub max_random_offset: f64,
    pub roughness: f64,
    pub curve_tightness: f64,
    pub curve_fitting: f64,
    pub curve_step_count: u32,
    pub disable_multi_stroke: bool,
    pub disable_font_mixture: bool,
}

impl Default for SketchStyle {
    fn default() -> Self {
        Self {
            bowing: 1.0,
            max_random_offset: 2.0,
            roughness: 1.0,
            curve_tightness: 0.0,
            curve_fitting: 0.95,
            curve_step_count: 9,
            disable_multi_stroke: false,
            disable_font_mixture: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PenMode {
    #[default]
    Stroke,
    Fill,
}

/// Payload of a `SetPen` op: the pen state for the path ops that follow it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pen {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
    pub mode: PenMode,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            opacity: 1.0,
            mode: PenMode::Stroke,
        }
    }
}

/// Payload of a `Dot` op: a filled marker dot, drawn outside the path state.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DotMark {
    pub center: Point,
    pub radius: f64,
    pub color: Color,
    pub opacity: f64,
}

/// Authoring hint for the glow dot a Sketch effect trails at the pen point.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlowHint {
    pub color: Color,
    pub radius: f64,
    pub frequency: f64,
}

impl GlowHint {
    pub fn new(color: Color, radius: f64, frequency: f64) -> ScrawlResult<Self> {
        if !(radius > 0.0) {
            return Err(ScrawlError::geometry("glow radius must be > 0"));
        }
        if !(frequency > 0.0) {
            return Err(ScrawlError::geometry("glow frequency must be > 0"));
        }
        Ok(Self {
            color,
            radius,
            frequency,
        })
    }
}

impl Default for GlowHint {
    fn default() -> Self {
        Self {
            color: Color::GRAY,
            radius: 5.0,
            frequency: 5.0,
        }
    }
}
