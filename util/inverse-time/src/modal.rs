use crate::{
    classify::MotionCode,
    config::{ConversionConfiguration, ConversionMode},
    coordinates::ArcPlane,
    error::{ConversionResult, ErrorKind, Precondition},
    events::ConversionEvent,
    parse::{word_value, SourceLine},
};

pub const WHOLE_FILE_FEED_MODE_WORD: &str = "G93 (Inverse Time Mode, Converted from G94)";

/// Modal settings gathered from every line seen so far.
#[derive(Clone, Debug, PartialEq)]
pub struct ModalState {
    pub feed_rate: Option<f64>,
    pub last_motion: Option<MotionCode>,
    pub feed_mode_set: bool,
    pub plane_set: bool,
    pub absolute_mode_set: bool,
    pub plane: ArcPlane,
    pub program_started: bool,
    pub program_ended: bool,
}
impl Default for ModalState {
    fn default() -> Self {
        Self {
            feed_rate: None,
            last_motion: None,
            feed_mode_set: false,
            plane_set: false,
            absolute_mode_set: false,
            plane: ArcPlane::XY,
            program_started: false,
            program_ended: false,
        }
    }
}
impl ModalState {
    /// Pulls every F word off the line, keeping the last value as the feed rate.
    /// F words are meaningless once the move is rewritten in inverse time, so the
    /// removed words are returned for callers that need to put them back.
    pub fn scan_feed(&mut self, source: &mut SourceLine, line: usize) -> ConversionResult<Vec<String>> {
        let feed_words = source.take_words('F');
        for word in &feed_words {
            let feed_rate = word_value::<f64>(word).ok_or_else(|| ErrorKind::Parse(word.clone()).at_line(line))?;
            self.feed_rate = Some(feed_rate);
        }
        Ok(feed_words)
    }

    pub fn scan_modal_codes(
        &mut self,
        config: &ConversionConfiguration,
        source: &mut SourceLine,
        line: usize,
        events: &mut Vec<ConversionEvent>,
    ) -> ConversionResult<()> {
        for word in source.words.iter_mut().filter(|word| word.starts_with('G')) {
            let code = word_value::<i64>(word).ok_or_else(|| ErrorKind::Parse(word.clone()).at_line(line))?;
            match code {
                93 => return Err(ErrorKind::InverseTimeInSource.at_line(line)),
                94 => {
                    self.feed_mode_set = true;
                    if config.conversion_mode == ConversionMode::WholeFile {
                        *word = WHOLE_FILE_FEED_MODE_WORD.to_string();
                    }
                    events.push(ConversionEvent::FeedModeFound { line });
                },
                90 => {
                    self.absolute_mode_set = true;
                    events.push(ConversionEvent::AbsoluteModeFound { line });
                },
                _ => if let Some(plane) = ArcPlane::from_code(code) {
                    self.plane_set = true;
                    self.plane = plane;
                    events.push(ConversionEvent::PlaneFound { line, plane });
                },
            }
        }
        Ok(())
    }

    /// What still has to be established before a feed-controlled move.
    pub fn unmet_preconditions(&self) -> Vec<Precondition> {
        [
            (self.feed_rate.is_some(), Precondition::FeedRate),
            (self.plane_set, Precondition::Plane),
            (self.absolute_mode_set, Precondition::AbsoluteMode),
            (self.feed_mode_set, Precondition::FeedMode),
        ]
        .into_iter()
        .filter_map(|(is_met, precondition)| (!is_met).then_some(precondition))
        .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scan_feed() {
        let mut state = ModalState::default();
        let mut source = SourceLine::split("G1 X1 F20 F30.5");
        assert_eq!(state.scan_feed(&mut source, 1).unwrap(), vec!["F20", "F30.5"]);
        assert_eq!(state.feed_rate, Some(30.5));
        assert_eq!(source.words, vec!["G1", "X1"]);
        let mut source = SourceLine::split("F1x");
        assert_eq!(state.scan_feed(&mut source, 7), Err(ErrorKind::Parse("F1x".into()).at_line(7)));
    }
    #[test]
    fn test_scan_modal_codes() {
        let mut state = ModalState::default();
        let mut events = Vec::new();
        let mut source = SourceLine::split("G90 G18 G94 G20");
        state.scan_modal_codes(&ConversionConfiguration::default(), &mut source, 4, &mut events).unwrap();
        assert!(state.absolute_mode_set && state.plane_set && state.feed_mode_set);
        assert_eq!(state.plane, ArcPlane::ZX);
        assert_eq!(source.words, vec!["G90", "G18", WHOLE_FILE_FEED_MODE_WORD, "G20"]);
        assert_eq!(events, vec![
            ConversionEvent::AbsoluteModeFound { line: 4 },
            ConversionEvent::PlaneFound { line: 4, plane: ArcPlane::ZX },
            ConversionEvent::FeedModeFound { line: 4 },
        ]);
        assert!(state.unmet_preconditions() == vec![Precondition::FeedRate]);
    }
    #[test]
    fn test_feed_mode_kept_when_wrapping() {
        let config = ConversionConfiguration { conversion_mode: ConversionMode::WrapEachRotaryMove, ..Default::default() };
        let mut state = ModalState::default();
        let mut source = SourceLine::split("G94");
        state.scan_modal_codes(&config, &mut source, 1, &mut Vec::new()).unwrap();
        assert_eq!(source.words, vec!["G94"]);
    }
    #[test]
    fn test_inverse_time_rejected() {
        let mut source = SourceLine::split("G17 G93 G90");
        let result = ModalState::default().scan_modal_codes(&ConversionConfiguration::default(), &mut source, 9, &mut Vec::new());
        assert_eq!(result, Err(ErrorKind::InverseTimeInSource.at_line(9)));
    }
}
