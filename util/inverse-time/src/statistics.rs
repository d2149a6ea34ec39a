use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::{classify::MotionCode, config::ConversionMode};

/// Below this many motion lines the advisories are not worth giving.
const ADVISORY_MINIMUM_LINES: u64 = 50;
const WRAPPING_ADVISED_BELOW: f64 = 0.15;
const WHOLE_FILE_ADVISED_ABOVE: f64 = 0.25;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub rapid_lines: u64,
    pub linear_lines: u64,
    pub clockwise_lines: u64,
    pub counterclockwise_lines: u64,
    /// Lines that gave A its first value or changed it.
    pub rotary_move_lines: u64,
    /// (min, max) of every A position reached.
    pub rotary_range: Option<(f64, f64)>,
    pub total_distance: f64,
    pub total_degrees: f64,
}
impl Statistics {
    pub fn count_motion(&mut self, code: MotionCode) {
        match code {
            MotionCode::Rapid => self.rapid_lines += 1,
            MotionCode::Linear => self.linear_lines += 1,
            MotionCode::Clockwise => self.clockwise_lines += 1,
            MotionCode::Counterclockwise => self.counterclockwise_lines += 1,
        }
    }
    pub fn extend_rotary_range(&mut self, position: f64) {
        match &mut self.rotary_range {
            Some((min, max)) => {
                *min = f64::min(*min, position);
                *max = f64::max(*max, position);
            },
            None => self.rotary_range = Some((position, position)),
        }
    }
    pub fn motion_lines(&self) -> u64 {
        self.rapid_lines + self.linear_lines + self.clockwise_lines + self.counterclockwise_lines
    }
    pub fn rotary_fraction(&self) -> f64 {
        match self.motion_lines() {
            0 => 0.0,
            total => self.rotary_move_lines as f64 / total as f64,
        }
    }
    pub fn advisories(&self, mode: ConversionMode) -> Vec<Advisory> {
        if self.motion_lines() <= ADVISORY_MINIMUM_LINES {
            return Vec::new();
        }
        let fraction = self.rotary_fraction();
        match mode {
            ConversionMode::WholeFile if fraction < WRAPPING_ADVISED_BELOW => vec![Advisory::PreferWrapping],
            ConversionMode::WrapEachRotaryMove if fraction > WHOLE_FILE_ADVISED_ABOVE => vec![Advisory::PreferWholeFile],
            _ => Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Advisory {
    PreferWrapping,
    PreferWholeFile,
}
impl Display for Advisory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::PreferWrapping => write!(
                f,
                "Only a small percentage of the lines in the input file had rotary moves. It may be more efficient to use the '{}' option instead of converting the entire file.",
                ConversionMode::WrapEachRotaryMove.description()
            ),
            Advisory::PreferWholeFile => write!(
                f,
                "A sizeable percentage of the lines in the input file had rotary moves. It may be more efficient to select the '{}' option instead of wrapping each rotary move.",
                ConversionMode::WholeFile.description()
            ),
        }
    }
}

/// The final human-readable summary of a run.
pub struct Report<'a> {
    pub statistics: &'a Statistics,
    pub mode: ConversionMode,
}
impl<'a> Display for Report<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let statistics = self.statistics;
        writeln!(f, "--------------------------")?;
        writeln!(f, "Number of G00 lines: {}", statistics.rapid_lines)?;
        writeln!(f, "Number of G01 lines: {}", statistics.linear_lines)?;
        writeln!(f, "Number of G02 lines: {}", statistics.clockwise_lines)?;
        writeln!(f, "Number of G03 lines: {}", statistics.counterclockwise_lines)?;
        writeln!(f, "Total G00+G01+G02+G03 lines: {}", statistics.motion_lines())?;
        writeln!(
            f,
            "Number lines with rotary moves: {}  ({}%)",
            statistics.rotary_move_lines,
            (statistics.rotary_fraction() * 100.0) as u64
        )?;
        match statistics.rotary_range {
            Some((min, max)) => writeln!(f, "Rotary (A-axis) Min/Max rotations: {}, {}", min, max)?,
            None => writeln!(f, "Rotary (A-axis) Min/Max rotations: No rotary axis moves found")?,
        }
        writeln!(f, "Total toolpath distance (including rotary moves): {:.4}", statistics.total_distance)?;
        writeln!(f, "Total degrees of rotation for A-axis: {:.4}", statistics.total_degrees)?;
        write!(f, "--------------------------")?;
        for advisory in statistics.advisories(self.mode) {
            write!(f, "\n{}", advisory)?;
        }
        Ok(())
    }
}
