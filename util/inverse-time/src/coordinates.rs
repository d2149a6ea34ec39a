use std::f64::consts::{PI, TAU};

use crate::{config::ConversionConfiguration, error::{ErrorKind, MissingAxis}};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis { X, Y, Z, A, I, J, K }
impl Axis {
    pub const ALL: [Axis; 7] = [Axis::X, Axis::Y, Axis::Z, Axis::A, Axis::I, Axis::J, Axis::K];
    /// Axes that describe where the machine is; I, J and K only describe a single arc.
    pub const POSITIONAL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::A];
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
            Axis::A => 'A',
            Axis::I => 'I',
            Axis::J => 'J',
            Axis::K => 'K',
        }
    }
    pub fn from_letter(letter: char) -> Option<Axis> {
        Axis::ALL.into_iter().find(|axis| axis.letter() == letter)
    }
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ArcPlane { XY, ZX, YZ }
impl ArcPlane {
    pub fn from_code(code: i64) -> Option<ArcPlane> {
        match code {
            17 => Some(ArcPlane::XY),
            18 => Some(ArcPlane::ZX),
            19 => Some(ArcPlane::YZ),
            _ => None,
        }
    }
    pub fn code(self) -> u8 {
        match self {
            ArcPlane::XY => 17,
            ArcPlane::ZX => 18,
            ArcPlane::YZ => 19,
        }
    }
    /// (first, second, first offset, second offset) as seen by the planar arc calculation.
    pub fn axes(self) -> (Axis, Axis, Axis, Axis) {
        match self {
            ArcPlane::XY => (Axis::X, Axis::Y, Axis::I, Axis::J),
            ArcPlane::ZX => (Axis::X, Axis::Z, Axis::I, Axis::K),
            ArcPlane::YZ => (Axis::Y, Axis::Z, Axis::J, Axis::K),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, derive_more::Add, derive_more::Sub)]
struct ArcVector(f64, f64);
impl ArcVector {
    pub fn magnitude(self) -> f64 {
        (self.0 * self.0 + self.1 * self.1).sqrt()
    }
    pub fn dot(self, other: ArcVector) -> f64 {
        self.0 * other.0 + self.1 * other.1
    }
    pub fn cross(self, other: ArcVector) -> f64 {
        self.0 * other.1 - self.1 * other.0
    }
}

/// The axis words of one line; any of them may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisCoordinate([Option<f64>; 7]);
impl AxisCoordinate {
    pub fn parse<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Result<Self, ErrorKind> {
        let mut coordinate = Self::default();
        for token in tokens {
            let mut chars = token.chars();
            let Some(axis) = chars.next().and_then(Axis::from_letter) else {
                continue
            };
            let value = chars.as_str().parse::<f64>().map_err(|_| ErrorKind::Parse(token.to_string()))?;
            coordinate.set(axis, value);
        }
        Ok(coordinate)
    }
    pub fn get(&self, axis: Axis) -> Option<f64> {
        self.0[axis.index()]
    }
    pub fn set(&mut self, axis: Axis, value: f64) {
        self.0[axis.index()] = Some(value);
    }
    pub fn with(mut self, axis: Axis, value: f64) -> Self {
        self.set(axis, value);
        self
    }
    /// Fill any missing X, Y, Z or A from `previous`; arc offsets are never carried over.
    pub fn merge_unset_from(&mut self, previous: &AxisCoordinate) {
        for axis in Axis::POSITIONAL {
            if self.get(axis).is_none() {
                self.0[axis.index()] = previous.get(axis);
            }
        }
    }
    /// The machine position after this move: X, Y, Z and A only.
    pub fn position(&self) -> AxisCoordinate {
        let mut position = AxisCoordinate::default();
        position.merge_unset_from(self);
        position
    }
    fn require(&self, axes: &[Axis], missing: MissingAxis) -> Result<(), ErrorKind> {
        if axes.iter().all(|axis| self.get(*axis).is_some()) {
            Ok(())
        } else {
            Err(ErrorKind::MissingAxis(missing))
        }
    }

    /// Straight-line length from `previous` to `self`, with A rotation folded in as arc length
    /// at the larger of the two radii (Z measured from the rotation axis).
    pub fn straight_distance(
        &self,
        previous: &AxisCoordinate,
        config: &ConversionConfiguration,
        require_both_set: bool,
    ) -> Result<f64, ErrorKind> {
        let mut squared_sum = 0.0;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            match (self.get(axis), previous.get(axis)) {
                (Some(current), Some(before)) => squared_sum += (current - before).powi(2),
                (None, None) => (),
                _ if require_both_set => return Err(ErrorKind::MissingAxis(MissingAxis::StartingPoint(axis))),
                _ => (),
            }
        }
        match (self.get(Axis::A), previous.get(Axis::A)) {
            (Some(current), Some(before)) => {
                let radius = [self.get(Axis::Z), previous.get(Axis::Z)]
                    .into_iter()
                    .flatten()
                    .map(|z| (z + config.z_zero_offset).abs())
                    .reduce(f64::max)
                    .ok_or(ErrorKind::MissingZForRotary)?
                    .max(config.min_rotary_radius());
                let angle = (current - before).abs() * PI / 180.0;
                squared_sum += (radius * angle).powi(2);
            },
            (None, None) => (),
            _ if require_both_set => return Err(ErrorKind::MissingAxis(MissingAxis::StartingPoint(Axis::A))),
            _ => (),
        }
        Ok(squared_sum.sqrt())
    }

    /// Length travelled along the arc from `previous` to `self` within `plane`.
    pub fn arc_distance(
        &self,
        previous: &AxisCoordinate,
        clockwise: bool,
        config: &ConversionConfiguration,
        plane: ArcPlane,
    ) -> Result<f64, ErrorKind> {
        let (first, second, first_offset, second_offset) = plane.axes();
        previous.require(&[first, second], MissingAxis::ArcStart(plane))?;
        self.require(&[first, second, first_offset, second_offset], MissingAxis::ArcArguments(plane))?;
        let value = |coordinate: &AxisCoordinate, axis| coordinate.get(axis).unwrap_or_default();
        let start = ArcVector(value(previous, first), value(previous, second));
        let end = ArcVector(value(self, first), value(self, second));
        let offset = ArcVector(value(self, first_offset), value(self, second_offset));
        arc_length(start, end, offset, clockwise, config.arc_radius_tolerance())
    }

    /// Absolute A rotation in degrees, or zero when either side has no A.
    pub fn rotation_abs_diff(&self, previous: &AxisCoordinate) -> f64 {
        match (self.get(Axis::A), previous.get(Axis::A)) {
            (Some(current), Some(before)) => (current - before).abs(),
            _ => 0.0,
        }
    }
}

fn arc_length(start: ArcVector, end: ArcVector, offset: ArcVector, clockwise: bool, tolerance: f64) -> Result<f64, ErrorKind> {
    let center = start + offset;
    let radius = offset.magnitude();
    if ((end - center).magnitude() - radius).abs() > tolerance {
        return Err(ErrorKind::NotCircular);
    }
    let start = start - center;
    let end = end - center;
    // Rotating the frame so that `start` lies on +x turns `end` into (start . end, start x end).
    let mut theta = f64::atan2(start.cross(end), start.dot(end));
    if theta < 0.0 {
        theta += TAU;
    }
    if theta >= TAU {
        theta -= TAU;
    }
    // Coincident endpoints describe a full circle, never an empty arc.
    Ok(if clockwise {
        radius * if theta == 0.0 { TAU } else { theta }
    } else {
        radius * (TAU - theta)
    })
}
