use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::coordinates::{Axis, ArcPlane};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MissingAxis {
    /// A feed-controlled straight move names an axis that has no starting value.
    StartingPoint(Axis),
    /// The arc's start position lacks one of the plane's axes.
    ArcStart(ArcPlane),
    /// The arc line lacks one of the plane's end or center words.
    ArcArguments(ArcPlane),
}
impl Display for MissingAxis {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MissingAxis::StartingPoint(axis) => write!(f, "G01 movement without an initial {} starting point", axis.letter()),
            MissingAxis::ArcStart(plane) => {
                let (first, second, _, _) = plane.axes();
                write!(f, "G02/G03 movement requires both {} and {} to have been previously set (G{})", first.letter(), second.letter(), plane.code())
            },
            MissingAxis::ArcArguments(plane) => {
                let (first, second, first_offset, second_offset) = plane.axes();
                write!(
                    f,
                    "G02/G03 movement requires {}, {}, {}, {} arguments (G{}); one or more are missing",
                    first.letter(), second.letter(), first_offset.letter(), second_offset.letter(), plane.code()
                )
            },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Precondition {
    FeedRate,
    Plane,
    AbsoluteMode,
    FeedMode,
}
impl Display for Precondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::FeedRate => write!(f, "feedrate not set"),
            Precondition::Plane => write!(f, "G17, G18, or G19 (plane) not set"),
            Precondition::AbsoluteMode => write!(f, "G90 not set"),
            Precondition::FeedMode => write!(f, "G94 not set"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("could not read a number from {0:?}")]
    Parse(String),
    #[error("{0}")]
    MissingAxis(MissingAxis),
    #[error("A-axis movement requires a prior Z-axis movement for the distance calculation")]
    MissingZForRotary,
    #[error("G02/G03 movement is not circular")]
    NotCircular,
    #[error("G93 found in input; retaining inverse time mode from the input is not supported")]
    InverseTimeInSource,
    #[error("implicit move given before any motion command (G0/1/2/3)")]
    NoPriorMotionCode,
    #[error("movement G-code (G01, G02, G03) found before the following requirements were set: {}", .0.iter().join(", "))]
    PreconditionsNotMet(Vec<Precondition>),
    #[error("feedrate must be positive and non-zero")]
    NonPositiveFeedRate,
}
impl ErrorKind {
    pub fn at_line(self, line: usize) -> ConversionError {
        ConversionError { line, kind: self }
    }
}

/// A fatal problem with the input; the run stops and its output must be discarded.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind} (line: {line})")]
pub struct ConversionError {
    /// 1-based input line number.
    pub line: usize,
    pub kind: ErrorKind,
}

pub type ConversionResult<T> = Result<T, ConversionError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages_carry_line() {
        let error = ErrorKind::PreconditionsNotMet(vec![Precondition::FeedRate, Precondition::FeedMode]).at_line(12);
        assert_eq!(
            error.to_string(),
            "movement G-code (G01, G02, G03) found before the following requirements were set: feedrate not set, G94 not set (line: 12)"
        );
        let error = ErrorKind::MissingAxis(MissingAxis::ArcArguments(ArcPlane::ZX)).at_line(3);
        assert_eq!(
            error.to_string(),
            "G02/G03 movement requires X, Z, I, K arguments (G18); one or more are missing (line: 3)"
        );
    }
}
