//! Fractal specifications: the complete, validated input to generation.
//!
//! A [`FractalSpec`] is `{type, depth, rules}`. It is only constructed through
//! validation, so generators and the melody mapper can treat it as trusted.
//! Depth and size parameters are clamped to the caps below rather than
//! rejected; every clamp is logged.

pub mod error;
pub mod params;

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

pub use error::SpecError;
pub use params::{
    BarnsleyParams, CarpetParams, DragonParams, KochContour, KochParams, LSystemParams,
    MandelbrotParams, RuleParams, SierpinskiParams, TreeParams,
};

/// Hard cap on recursion depth.
pub const MAX_DEPTH: u32 = 12;
/// Budget of primitives (segments, triangles, squares) per generation call.
pub const MAX_ELEMENTS: u64 = 1 << 20;
/// Budget of symbols in an expanded L-system string.
pub const MAX_SYMBOLS: usize = 1 << 22;
/// Cap on Barnsley fern points.
pub const MAX_POINTS: u32 = 1_000_000;
/// Cap on Mandelbrot iterations per sample.
pub const MAX_ITERATIONS: u32 = 10_000;
/// Cap on either side of a Mandelbrot field.
pub const MAX_FIELD_SIDE: u32 = 4096;

/// Depth used when a saved spec omits it.
pub const DEFAULT_DEPTH: u32 = 3;

/// The recognized fractal families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalType {
    Tree,
    Koch,
    Mandelbrot,
    Dragon,
    Barnsley,
    Sierpinski,
    Carpet,
}

impl FractalType {
    pub const ALL: [FractalType; 7] = [
        Self::Tree,
        Self::Koch,
        Self::Mandelbrot,
        Self::Dragon,
        Self::Barnsley,
        Self::Sierpinski,
        Self::Carpet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Koch => "koch",
            Self::Mandelbrot => "mandelbrot",
            Self::Dragon => "dragon",
            Self::Barnsley => "barnsley",
            Self::Sierpinski => "sierpinski",
            Self::Carpet => "carpet",
        }
    }
}

impl fmt::Display for FractalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FractalType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SpecError::UnsupportedType(s.to_string()))
    }
}

/// A validated fractal description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFractalSpec")]
pub struct FractalSpec {
    kind: FractalType,
    depth: u32,
    params: RuleParams,
}

impl FractalSpec {
    /// Validate and normalize a spec.
    ///
    /// Negative depths and malformed params are rejected. Depth is clamped to
    /// [`MAX_DEPTH`] and further lowered so the primitive count stays within
    /// [`MAX_ELEMENTS`].
    pub fn new(kind: FractalType, depth: i64, params: RuleParams) -> Result<Self, SpecError> {
        if depth < 0 {
            return Err(SpecError::InvalidDepth(depth));
        }
        if !params.fits(kind) {
            return Err(SpecError::ParamsMismatch { kind });
        }
        let params = params.validate()?;

        let mut depth = u32::try_from(depth).unwrap_or(u32::MAX);
        if depth > MAX_DEPTH {
            warn!("{kind} depth {depth} clamped to {MAX_DEPTH}");
            depth = MAX_DEPTH;
        }
        if let Some(growth) = growth_factor(&params) {
            let budget = depth_budget(growth);
            if depth > budget {
                warn!("{kind} depth {depth} lowered to {budget} to stay within {MAX_ELEMENTS} primitives");
                depth = budget;
            }
        }

        Ok(Self {
            kind,
            depth,
            params,
        })
    }

    /// The type's default scalar params at `depth`.
    pub fn with_defaults(kind: FractalType, depth: i64) -> Result<Self, SpecError> {
        Self::new(kind, depth, RuleParams::defaults(kind))
    }

    /// The type's built-in L-system at `depth`.
    pub fn lsystem_default(kind: FractalType, depth: i64) -> Result<Self, SpecError> {
        let params = LSystemParams::default_for(kind)
            .ok_or_else(|| SpecError::UnsupportedType(format!("{kind} (l-system)")))?;
        Self::new(kind, depth, RuleParams::LSystem(params))
    }

    /// Parse a type name plus a loosely-typed rules object.
    pub fn from_parts(
        type_name: &str,
        depth: i64,
        rules: serde_json::Value,
    ) -> Result<Self, SpecError> {
        let kind: FractalType = type_name.parse()?;
        let params = RuleParams::from_value(kind, rules)?;
        Self::new(kind, depth, params)
    }

    pub fn kind(&self) -> FractalType {
        self.kind
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn params(&self) -> &RuleParams {
        &self.params
    }

    /// Same type and params, different depth.
    pub fn with_depth(&self, depth: i64) -> Result<Self, SpecError> {
        Self::new(self.kind, depth, self.params.clone())
    }

    /// Lower the depth to `cap` if it is above it.
    pub fn capped(mut self, cap: u32) -> Self {
        if self.depth > cap {
            warn!("{} depth {} clamped to session cap {cap}", self.kind, self.depth);
            self.depth = cap;
        }
        self
    }
}

impl Serialize for FractalSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FractalSpec", 3)?;
        s.serialize_field("type", &self.kind)?;
        s.serialize_field("depth", &self.depth)?;
        s.serialize_field("rules", &self.params)?;
        s.end()
    }
}

/// Unvalidated wire form of a spec.
#[derive(Debug, Deserialize)]
struct RawFractalSpec {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default = "default_depth")]
    depth: i64,
    #[serde(default)]
    rules: serde_json::Value,
}

fn default_depth() -> i64 {
    DEFAULT_DEPTH as i64
}

impl TryFrom<RawFractalSpec> for FractalSpec {
    type Error = SpecError;

    fn try_from(raw: RawFractalSpec) -> Result<Self, Self::Error> {
        Self::from_parts(&raw.kind, raw.depth, raw.rules)
    }
}

/// Primitives multiply by this factor per depth step, for param records whose
/// size is driven by depth.
fn growth_factor(params: &RuleParams) -> Option<u64> {
    match params {
        RuleParams::Tree(p) => Some(p.branches as u64),
        RuleParams::Koch(p) => Some(p.segments as u64),
        RuleParams::Carpet(p) => Some(if p.keep_center { 9 } else { 8 }),
        RuleParams::Sierpinski(_) => Some(3),
        RuleParams::Dragon(_) => Some(2),
        RuleParams::Mandelbrot(_) | RuleParams::Barnsley(_) | RuleParams::LSystem(_) => None,
    }
}

/// Largest depth `d` with `4 * growth^d <= MAX_ELEMENTS`; the factor of 4
/// covers snowflake sides and tree interior nodes.
fn depth_budget(growth: u64) -> u32 {
    if growth <= 1 {
        return MAX_DEPTH;
    }
    let mut depth = 0;
    let mut size: u64 = 4;
    while depth < MAX_DEPTH {
        size = size.saturating_mul(growth);
        if size > MAX_ELEMENTS {
            break;
        }
        depth += 1;
    }
    depth
}
