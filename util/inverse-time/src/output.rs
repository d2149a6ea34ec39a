use std::fmt::{Display, Formatter, self};

use crate::config::ConversionConfiguration;

pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d %H:%M:%S";
const RULE: &str = "(-------------------------------------------------------------)";

/// A feed rate as it appears in restorative blocks: shortest form, always with a decimal point.
pub struct FeedLiteral(pub f64);
impl Display for FeedLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() && self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

pub fn inverse_feed_word(config: &ConversionConfiguration, inverse_feed: f64) -> String {
    format!("F{:.*}", config.feed_precision as usize, inverse_feed)
}

/// Lines spliced in front of the program terminator to leave the machine in G94.
pub fn program_end_block(feed_rate: Option<f64>) -> Vec<String> {
    let mut lines = vec!["G94 (Added to revert back to standard G94 feed rate mode)".to_string()];
    if let Some(feed_rate) = feed_rate {
        lines.push(format!("F{} (last feed rate used)", FeedLiteral(feed_rate)));
    }
    lines
}

/// Puts one line into inverse time mode and restores the ordinary feed afterwards.
pub fn wrap_in_inverse_time(lines: Vec<String>, feed_rate: Option<f64>) -> Vec<String> {
    let mut wrapped = Vec::with_capacity(lines.len() + 3);
    wrapped.push("G93".to_string());
    wrapped.extend(lines);
    wrapped.push("G94".to_string());
    if let Some(feed_rate) = feed_rate {
        wrapped.push(format!("F{}", FeedLiteral(feed_rate)));
    }
    wrapped
}

pub fn preamble(config: &ConversionConfiguration, timestamp: &str) -> Vec<String> {
    vec![
        RULE.to_string(),
        "(       Converted G-code from G94 to G93 Inverse Time        )".to_string(),
        format!("(       {} {}       )", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        "( WARNING: Review and test program for your machine and setup.)".to_string(),
        "(          Use this program at your own risk                  )".to_string(),
        format!("(                    {}                     )", timestamp),
        format!("(       Z-zero offset from A-axis: {}                        )", config.z_zero_offset),
        format!("(       Conversion Mode: {}         )", config.conversion_mode.description()),
        format!("(       Distance Units: {}                                )", config.units.name()),
        format!("(       F value output decimal digits : {}                     )", config.feed_precision),
        RULE.to_string(),
    ]
}
