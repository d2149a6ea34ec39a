use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::coordinates::ArcPlane;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Severity { Info, Warning }

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ProgramEndMarker { Percent, EndCode }

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ConversionEvent {
    FeedModeFound { line: usize },
    PlaneFound { line: usize, plane: ArcPlane },
    AbsoluteModeFound { line: usize },
    ProgramStartFound { line: usize },
    ProgramEndFound { line: usize, marker: ProgramEndMarker },
    PreambleAdded { line: usize },
    /// The move has no length (or the feed no speed); its inverse time feed is written as zero.
    ZeroInverseFeed { line: usize },
    MissingProgramEnd,
}
impl ConversionEvent {
    pub fn severity(&self) -> Severity {
        match self {
            ConversionEvent::ZeroInverseFeed { .. } | ConversionEvent::MissingProgramEnd => Severity::Warning,
            _ => Severity::Info,
        }
    }
    pub fn line(&self) -> Option<usize> {
        match self {
            ConversionEvent::FeedModeFound { line }
            | ConversionEvent::PlaneFound { line, .. }
            | ConversionEvent::AbsoluteModeFound { line }
            | ConversionEvent::ProgramStartFound { line }
            | ConversionEvent::ProgramEndFound { line, .. }
            | ConversionEvent::PreambleAdded { line }
            | ConversionEvent::ZeroInverseFeed { line } => Some(*line),
            ConversionEvent::MissingProgramEnd => None,
        }
    }
    /// Mirrors the event to the tracing subscriber, if any.
    pub fn trace(&self) {
        match (self.severity(), self.line()) {
            (Severity::Info, Some(line)) => tracing::info!(line, "{}", self),
            (Severity::Info, None) => tracing::info!("{}", self),
            (Severity::Warning, Some(line)) => tracing::warn!(line, "{}", self),
            (Severity::Warning, None) => tracing::warn!("{}", self),
        }
    }
}
impl Display for ConversionEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConversionEvent::FeedModeFound { line } => write!(f, "- G94 (Feed Rate Mode: units per minute) found, line {}", line),
            ConversionEvent::PlaneFound { line, plane } => {
                let name = match plane {
                    ArcPlane::XY => "XY",
                    ArcPlane::ZX => "ZX",
                    ArcPlane::YZ => "YZ",
                };
                write!(f, "- G{} (Plane Select: {}) found, line {}", plane.code(), name, line)
            },
            ConversionEvent::AbsoluteModeFound { line } => write!(f, "- G90 (Set absolute distance mode) found, line {}", line),
            ConversionEvent::ProgramStartFound { line } => write!(f, "- Start of program found (%) on line {}", line),
            ConversionEvent::ProgramEndFound { line, marker: ProgramEndMarker::Percent } => write!(f, "- End of program found (%) on line {}", line),
            ConversionEvent::ProgramEndFound { line, marker: ProgramEndMarker::EndCode } => write!(f, "- End of program found (M2 and/or M30) on line {}", line),
            ConversionEvent::PreambleAdded { .. } => write!(f, "- Preamble added to output file"),
            ConversionEvent::ZeroInverseFeed { line } => write!(f, "WARNING: zero distance, zero speed, or infinite speed for move on line: {}", line),
            ConversionEvent::MissingProgramEnd => write!(
                f,
                "WARNING: no end of program found (%, M2, or M30). A G94 command was not inserted at the end of the output file."
            ),
        }
    }
}
