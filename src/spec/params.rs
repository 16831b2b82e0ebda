//! Per-type parameter records and their validation.
//!
//! Field names follow the camelCase keys used by saved presets
//! (`lengthFactor`, `maxIterations`, ...). Every record tolerates missing
//! fields by falling back to the type's defaults, and carries an optional
//! `color` hint that is passed through to the renderer untouched.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::SpecError;
use super::{FractalType, MAX_FIELD_SIDE, MAX_ITERATIONS, MAX_POINTS};
use crate::grammar::RuleSet;

/// Upper bound on tree branches per node.
pub const MAX_BRANCHES: u32 = 8;
/// Upper bound on sub-segments per Koch generation.
pub const MAX_KOCH_SEGMENTS: u32 = 16;

/// Recursive branching tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeParams {
    /// Spread between neighbouring branches, in degrees.
    pub angle: f64,
    pub length_factor: f64,
    pub branches: u32,
    pub init_length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            angle: 45.0,
            length_factor: 0.67,
            branches: 2,
            init_length: 80.0,
            color: None,
        }
    }
}

/// How Koch point counts are turned into scale indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KochContour {
    /// Up the scale and back down again.
    #[default]
    Sawtooth,
    /// `|sin(i)|` folded onto the scale.
    Sine,
}

/// Koch curve or snowflake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KochParams {
    pub segments: u32,
    /// Bump angle in degrees.
    pub angle: f64,
    pub scale_factor: f64,
    pub side_length: f64,
    /// Three outward curves around a triangle instead of a single line.
    pub snowflake: bool,
    pub contour: KochContour,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for KochParams {
    fn default() -> Self {
        Self {
            segments: 4,
            angle: 60.0,
            scale_factor: 1.0 / 3.0,
            side_length: 240.0,
            snowflake: true,
            contour: KochContour::Sawtooth,
            color: None,
        }
    }
}

/// Escape-time field over the complex plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MandelbrotParams {
    pub max_iterations: u32,
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Field resolution in samples.
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for MandelbrotParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            width: 400,
            height: 300,
            color: None,
        }
    }
}

/// Midpoint-displacement dragon curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DragonParams {
    /// Perpendicular offset of each inserted point, as a fraction of the
    /// segment vector.
    pub scale_factor: f64,
    /// Length of the initial segment.
    pub length: f64,
    /// Alternate the fold direction along the polyline.
    pub alternate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for DragonParams {
    fn default() -> Self {
        Self {
            scale_factor: 0.5,
            length: 100.0,
            alternate: false,
            color: None,
        }
    }
}

/// Barnsley fern iterated function system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarnsleyParams {
    /// Negative counts read as zero.
    #[serde(deserialize_with = "count_or_zero")]
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for BarnsleyParams {
    fn default() -> Self {
        Self {
            points: 10_000,
            color: None,
        }
    }
}

/// Sierpiński triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SierpinskiParams {
    pub side_length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for SierpinskiParams {
    fn default() -> Self {
        Self {
            side_length: 240.0,
            color: None,
        }
    }
}

/// Sierpiński carpet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarpetParams {
    pub side_length: f64,
    pub keep_center: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for CarpetParams {
    fn default() -> Self {
        Self {
            side_length: 240.0,
            keep_center: false,
            color: None,
        }
    }
}

/// Grammar-driven turtle drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LSystemParams {
    pub axiom: String,
    #[serde(default)]
    pub rules: RuleSet,
    /// Turn angle in degrees.
    pub angle: f64,
    #[serde(default = "default_step_length")]
    pub step_length: f64,
    /// Step shrink per generation, so deeper expansions keep their size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn default_step_length() -> f64 {
    10.0
}

impl LSystemParams {
    pub fn new(axiom: impl Into<String>, rules: RuleSet, angle: f64) -> Self {
        Self {
            axiom: axiom.into(),
            rules,
            angle,
            step_length: default_step_length(),
            scale_factor: None,
            color: None,
        }
    }

    /// Built-in grammar for a fractal type, if it has one.
    pub fn default_for(kind: FractalType) -> Option<Self> {
        let params = match kind {
            FractalType::Dragon => Self::new(
                "FX",
                RuleSet::literal([('X', "X+YF+"), ('Y', "-FX-Y")]),
                90.0,
            ),
            FractalType::Koch => Self::new("F", RuleSet::literal([('F', "F+F-F-F+F")]), 90.0),
            FractalType::Tree => Self::new("F", RuleSet::literal([('F', "F[+F]F[-F]F")]), 25.0),
            FractalType::Barnsley => Self::new(
                "X",
                RuleSet::literal([('X', "F+[[X]-X]-F[-FX]+X"), ('F', "FF")]),
                25.0,
            ),
            FractalType::Mandelbrot | FractalType::Sierpinski | FractalType::Carpet => {
                return None
            }
        };
        Some(params)
    }
}

/// Parameters for one fractal, shaped by its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleParams {
    Tree(TreeParams),
    Koch(KochParams),
    Mandelbrot(MandelbrotParams),
    Dragon(DragonParams),
    Barnsley(BarnsleyParams),
    Sierpinski(SierpinskiParams),
    Carpet(CarpetParams),
    LSystem(LSystemParams),
}

impl RuleParams {
    /// The scalar defaults for `kind`.
    pub fn defaults(kind: FractalType) -> Self {
        match kind {
            FractalType::Tree => Self::Tree(TreeParams::default()),
            FractalType::Koch => Self::Koch(KochParams::default()),
            FractalType::Mandelbrot => Self::Mandelbrot(MandelbrotParams::default()),
            FractalType::Dragon => Self::Dragon(DragonParams::default()),
            FractalType::Barnsley => Self::Barnsley(BarnsleyParams::default()),
            FractalType::Sierpinski => Self::Sierpinski(SierpinskiParams::default()),
            FractalType::Carpet => Self::Carpet(CarpetParams::default()),
        }
    }

    /// Interpret a loosely-typed rules object for `kind`.
    ///
    /// `null` yields the defaults; an object with an `axiom` key is an
    /// L-system; anything else must match the type's own record.
    pub fn from_value(kind: FractalType, value: serde_json::Value) -> Result<Self, SpecError> {
        let invalid = |e: serde_json::Error| SpecError::param("rules", e.to_string());
        if value.is_null() {
            return Ok(Self::defaults(kind));
        }
        let lsystem = value.get("axiom").is_some();
        let known = if lsystem {
            LSYSTEM_KEYS.iter().map(|k| k.to_string()).collect()
        } else {
            scalar_keys(kind)
        };
        for key in unknown_keys(&value, &known) {
            warn!("ignoring unknown {kind} rule key '{key}'");
        }
        if lsystem {
            return serde_json::from_value(value).map(Self::LSystem).map_err(invalid);
        }
        let params = match kind {
            FractalType::Tree => Self::Tree(serde_json::from_value(value).map_err(invalid)?),
            FractalType::Koch => Self::Koch(serde_json::from_value(value).map_err(invalid)?),
            FractalType::Mandelbrot => {
                Self::Mandelbrot(serde_json::from_value(value).map_err(invalid)?)
            }
            FractalType::Dragon => Self::Dragon(serde_json::from_value(value).map_err(invalid)?),
            FractalType::Barnsley => {
                Self::Barnsley(serde_json::from_value(value).map_err(invalid)?)
            }
            FractalType::Sierpinski => {
                Self::Sierpinski(serde_json::from_value(value).map_err(invalid)?)
            }
            FractalType::Carpet => Self::Carpet(serde_json::from_value(value).map_err(invalid)?),
        };
        Ok(params)
    }

    /// Whether this record can drive a fractal of `kind`. L-system rules fit any type.
    pub fn fits(&self, kind: FractalType) -> bool {
        matches!(
            (self, kind),
            (Self::LSystem(_), _)
                | (Self::Tree(_), FractalType::Tree)
                | (Self::Koch(_), FractalType::Koch)
                | (Self::Mandelbrot(_), FractalType::Mandelbrot)
                | (Self::Dragon(_), FractalType::Dragon)
                | (Self::Barnsley(_), FractalType::Barnsley)
                | (Self::Sierpinski(_), FractalType::Sierpinski)
                | (Self::Carpet(_), FractalType::Carpet)
        )
    }

    pub fn is_lsystem(&self) -> bool {
        matches!(self, Self::LSystem(_))
    }

    /// Check ranges and clamp size parameters to their documented caps.
    pub(crate) fn validate(self) -> Result<Self, SpecError> {
        match self {
            Self::Tree(p) => {
                finite("angle", p.angle)?;
                positive("lengthFactor", p.length_factor)?;
                positive("initLength", p.init_length)?;
                if p.branches == 0 || p.branches > MAX_BRANCHES {
                    return Err(SpecError::param(
                        "branches",
                        format!("must be between 1 and {MAX_BRANCHES}, got {}", p.branches),
                    ));
                }
                Ok(Self::Tree(p))
            }
            Self::Koch(p) => {
                finite("angle", p.angle)?;
                positive("sideLength", p.side_length)?;
                if !(p.scale_factor > 0.0 && p.scale_factor < 1.0) {
                    return Err(SpecError::param(
                        "scaleFactor",
                        format!("must be inside (0, 1), got {}", p.scale_factor),
                    ));
                }
                if p.segments == 0 || p.segments > MAX_KOCH_SEGMENTS {
                    return Err(SpecError::param(
                        "segments",
                        format!(
                            "must be between 1 and {MAX_KOCH_SEGMENTS}, got {}",
                            p.segments
                        ),
                    ));
                }
                Ok(Self::Koch(p))
            }
            Self::Mandelbrot(mut p) => {
                positive("zoom", p.zoom)?;
                finite("offsetX", p.offset_x)?;
                finite("offsetY", p.offset_y)?;
                if p.max_iterations == 0 {
                    return Err(SpecError::param("maxIterations", "must be at least 1"));
                }
                if p.width == 0 || p.height == 0 {
                    return Err(SpecError::param("width", "field must be at least 1x1"));
                }
                p.max_iterations = clamp_count("maxIterations", p.max_iterations, MAX_ITERATIONS);
                p.width = clamp_count("width", p.width, MAX_FIELD_SIDE);
                p.height = clamp_count("height", p.height, MAX_FIELD_SIDE);
                Ok(Self::Mandelbrot(p))
            }
            Self::Dragon(p) => {
                positive("scaleFactor", p.scale_factor)?;
                positive("length", p.length)?;
                Ok(Self::Dragon(p))
            }
            Self::Barnsley(mut p) => {
                p.points = clamp_count("points", p.points, MAX_POINTS);
                Ok(Self::Barnsley(p))
            }
            Self::Sierpinski(p) => {
                positive("sideLength", p.side_length)?;
                Ok(Self::Sierpinski(p))
            }
            Self::Carpet(p) => {
                positive("sideLength", p.side_length)?;
                Ok(Self::Carpet(p))
            }
            Self::LSystem(p) => {
                finite("angle", p.angle)?;
                positive("stepLength", p.step_length)?;
                if let Some(scale) = p.scale_factor {
                    positive("scaleFactor", scale)?;
                }
                Ok(Self::LSystem(p))
            }
        }
    }
}

const LSYSTEM_KEYS: [&str; 6] = ["axiom", "rules", "angle", "stepLength", "scaleFactor", "color"];

/// Keys of the scalar record for `kind`.
fn scalar_keys(kind: FractalType) -> Vec<String> {
    let mut keys: Vec<String> = match serde_json::to_value(RuleParams::defaults(kind)) {
        Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    keys.push("color".to_string());
    keys
}

fn unknown_keys<'a>(value: &'a serde_json::Value, known: &[String]) -> Vec<&'a str> {
    value
        .as_object()
        .map(|map| {
            map.keys()
                .map(String::as_str)
                .filter(|key| !known.iter().any(|k| k == key))
                .collect()
        })
        .unwrap_or_default()
}

fn finite(field: &'static str, value: f64) -> Result<(), SpecError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SpecError::param(field, format!("must be finite, got {value}")))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), SpecError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SpecError::param(field, format!("must be positive, got {value}")))
    }
}

/// Read a count that may arrive negative from a hand-edited rules object.
fn count_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    if raw < 0 {
        warn!("count {raw} read as 0");
        return Ok(0);
    }
    Ok(u32::try_from(raw).unwrap_or(u32::MAX))
}

fn clamp_count(field: &str, value: u32, max: u32) -> u32 {
    if value > max {
        warn!("{field} {value} clamped to {max}");
        max
    } else {
        value
    }
}
