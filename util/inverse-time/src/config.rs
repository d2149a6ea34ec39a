use serde::{Deserialize, Serialize};

/// Smallest radius used when folding A-axis rotation into a linear distance, in inches.
pub const MIN_ROTARY_RADIUS: f64 = 0.25;
/// Allowed mismatch between the start and end radius of an arc, in inches.
pub const ARC_RADIUS_TOLERANCE: f64 = 0.001;
pub const MILLIMETERS_PER_INCH: f64 = 25.4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// Every G94 becomes G93 and every feed-controlled move gets an inverse time feed.
    WholeFile,
    /// Only moves that rotate the A axis are switched into G93, one at a time.
    WrapEachRotaryMove,
}
impl ConversionMode {
    pub fn description(self) -> &'static str {
        match self {
            ConversionMode::WholeFile => "Use G93 mode for entire file",
            ConversionMode::WrapEachRotaryMove => "Wrap each rotary move in G93",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Inches,
    Millimeters,
}
impl Units {
    /// Factor applied to the inch-denominated tolerances.
    pub fn tolerance_scale(self) -> f64 {
        match self {
            Units::Inches => 1.0,
            Units::Millimeters => MILLIMETERS_PER_INCH,
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            Units::Inches => "inches",
            Units::Millimeters => "mm",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfiguration {
    pub conversion_mode: ConversionMode,
    pub units: Units,
    /// Distance from Z zero down to the A axis of rotation.
    pub z_zero_offset: f64,
    /// Digits written after the decimal point of injected F words.
    pub feed_precision: u8,
}
impl ConversionConfiguration {
    pub fn min_rotary_radius(&self) -> f64 {
        MIN_ROTARY_RADIUS * self.units.tolerance_scale()
    }
    pub fn arc_radius_tolerance(&self) -> f64 {
        ARC_RADIUS_TOLERANCE * self.units.tolerance_scale()
    }
    pub fn wraps_rotary_moves(&self) -> bool {
        self.conversion_mode == ConversionMode::WrapEachRotaryMove
    }
}
impl Default for ConversionConfiguration {
    fn default() -> Self {
        Self {
            conversion_mode: ConversionMode::WholeFile,
            units: Units::Inches,
            z_zero_offset: 0.0,
            feed_precision: 5,
        }
    }
}
