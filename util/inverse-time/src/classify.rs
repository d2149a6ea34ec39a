use crate::coordinates::Axis;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MotionCode {
    Rapid,
    Linear,
    Clockwise,
    Counterclockwise,
}
impl MotionCode {
    pub fn from_word(word: &str) -> Option<MotionCode> {
        const WORDS: [(&str, MotionCode); 8] = [
            ("G0", MotionCode::Rapid),
            ("G00", MotionCode::Rapid),
            ("G1", MotionCode::Linear),
            ("G01", MotionCode::Linear),
            ("G2", MotionCode::Clockwise),
            ("G02", MotionCode::Clockwise),
            ("G3", MotionCode::Counterclockwise),
            ("G03", MotionCode::Counterclockwise),
        ];
        // Whole-word comparison, so that e.g. G30 is never read as G3.
        WORDS.iter().find(|(name, _)| name.eq_ignore_ascii_case(word)).map(|(_, code)| *code)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MovementClassification {
    NonMovement,
    ExplicitMovement(MotionCode),
    /// Axis words without a motion code; continues the last motion code.
    ImplicitMovement,
}

pub fn classify<'a>(words: impl Iterator<Item = &'a str> + Clone) -> MovementClassification {
    if let Some(code) = words.clone().find_map(MotionCode::from_word) {
        return MovementClassification::ExplicitMovement(code);
    }
    let mut implicit = words.filter_map(|word| word.chars().next().and_then(Axis::from_letter));
    if implicit.any(|axis| Axis::POSITIONAL.contains(&axis)) {
        MovementClassification::ImplicitMovement
    } else {
        MovementClassification::NonMovement
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn classify_line(line: &str) -> MovementClassification {
        classify(line.split_whitespace())
    }

    #[test]
    fn test_explicit() {
        assert_eq!(classify_line("N5 G01 X1"), MovementClassification::ExplicitMovement(MotionCode::Linear));
        assert_eq!(classify_line("X1 Y2 G3 I1 J0"), MovementClassification::ExplicitMovement(MotionCode::Counterclockwise));
        assert_eq!(classify_line("g0 Z1"), MovementClassification::ExplicitMovement(MotionCode::Rapid));
    }
    #[test]
    fn test_implicit() {
        assert_eq!(classify_line("G30 Z1"), MovementClassification::ImplicitMovement);
        assert_eq!(classify_line("A45"), MovementClassification::ImplicitMovement);
    }
    #[test]
    fn test_non_movement() {
        assert_eq!(classify_line("G30"), MovementClassification::NonMovement);
        assert_eq!(classify_line("G90 G17 M3 S1000"), MovementClassification::NonMovement);
        assert_eq!(classify_line("I1 J2"), MovementClassification::NonMovement);
        assert_eq!(classify_line(""), MovementClassification::NonMovement);
    }
}
