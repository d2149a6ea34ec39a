use chrono::Local;
use itertools::Itertools;

use crate::{
    classify::{classify, MotionCode, MovementClassification},
    config::ConversionConfiguration,
    coordinates::{Axis, AxisCoordinate},
    error::{ConversionResult, ErrorKind},
    events::{ConversionEvent, ProgramEndMarker},
    modal::ModalState,
    output::{inverse_feed_word, preamble, program_end_block, wrap_in_inverse_time, TIMESTAMP_FORMAT},
    parse::SourceLine,
    statistics::{Advisory, Report, Statistics},
};

/// Everything one run knows about the program so far. Each line is interpreted against
/// the context built from the lines before it, then updates it.
#[derive(Clone, Debug, Default)]
pub struct ConversionContext {
    pub modal: ModalState,
    /// Machine position (X, Y, Z, A) after the last movement line.
    pub last_position: AxisCoordinate,
    pub statistics: Statistics,
    pub events: Vec<ConversionEvent>,
}
impl ConversionContext {
    fn emit(&mut self, event: ConversionEvent) {
        event.trace();
        self.events.push(event);
    }
}

#[derive(Clone, Debug, PartialEq)]
struct MoveOutcome {
    /// The line moves A under feed control; in wrapping mode it is put into G93 on its own.
    rotary_bearing: bool,
}

fn process_movement(
    config: &ConversionConfiguration,
    context: &mut ConversionContext,
    source: &mut SourceLine,
    line: usize,
) -> ConversionResult<Option<MoveOutcome>> {
    let code = match classify(source.word_strs()) {
        MovementClassification::NonMovement => return Ok(None),
        MovementClassification::ExplicitMovement(code) => code,
        MovementClassification::ImplicitMovement => context.modal.last_motion
            .ok_or_else(|| ErrorKind::NoPriorMotionCode.at_line(line))?,
    };
    context.modal.last_motion = Some(code);
    if code != MotionCode::Rapid {
        let missing = context.modal.unmet_preconditions();
        if !missing.is_empty() {
            return Err(ErrorKind::PreconditionsNotMet(missing).at_line(line));
        }
    }

    let mut end = AxisCoordinate::parse(source.word_strs()).map_err(|kind| kind.at_line(line))?;
    end.merge_unset_from(&context.last_position);
    let previous = &context.last_position;
    let plane = context.modal.plane;
    let (distance, degrees) = match code {
        MotionCode::Rapid => (end.straight_distance(previous, config, false), end.rotation_abs_diff(previous)),
        MotionCode::Linear => (end.straight_distance(previous, config, true), end.rotation_abs_diff(previous)),
        MotionCode::Clockwise => (end.arc_distance(previous, true, config, plane), 0.0),
        MotionCode::Counterclockwise => (end.arc_distance(previous, false, config, plane), 0.0),
    };
    let distance = distance.map_err(|kind| kind.at_line(line))?;

    let rotates = match (end.get(Axis::A), previous.get(Axis::A)) {
        (Some(_), None) => true,
        (Some(current), Some(before)) => current != before,
        (None, _) => false,
    };
    let rotary_bearing = rotates && code != MotionCode::Rapid;
    let injects_feed = code != MotionCode::Rapid && (rotary_bearing || !config.wraps_rotary_moves());
    if injects_feed {
        let feed_rate = context.modal.feed_rate
            .filter(|feed_rate| *feed_rate > 0.0)
            .ok_or_else(|| ErrorKind::NonPositiveFeedRate.at_line(line))?;
        let minutes = distance / feed_rate;
        let inverse_feed = if minutes > 0.0 {
            1.0 / minutes
        } else {
            context.emit(ConversionEvent::ZeroInverseFeed { line });
            0.0
        };
        source.words.push(inverse_feed_word(config, inverse_feed));
    }

    let statistics = &mut context.statistics;
    statistics.count_motion(code);
    statistics.total_distance += distance;
    statistics.total_degrees += degrees;
    if rotates {
        statistics.rotary_move_lines += 1;
    }
    context.last_position = end.position();
    if let Some(position) = context.last_position.get(Axis::A) {
        context.statistics.extend_rotary_range(position);
    }
    Ok(Some(MoveOutcome { rotary_bearing }))
}

/// Looks for `%`, `M2` and `M30`. Returns whether the program starts on this line and
/// the index of the word the restorative block must precede, if the program ends here.
fn scan_program_boundaries(context: &mut ConversionContext, source: &SourceLine, line: usize) -> (bool, Option<usize>) {
    let mut starts_here = false;
    let mut splice_at = None;
    for (index, word) in source.words.iter().enumerate() {
        if word.starts_with('%') {
            if !context.modal.program_started {
                context.modal.program_started = true;
                starts_here = true;
                context.emit(ConversionEvent::ProgramStartFound { line });
            } else if !context.modal.program_ended {
                context.modal.program_ended = true;
                splice_at = Some(index);
                context.emit(ConversionEvent::ProgramEndFound { line, marker: ProgramEndMarker::Percent });
            }
        }
        if (word.starts_with("M2") || word.starts_with("M30")) && !context.modal.program_ended {
            context.modal.program_ended = true;
            splice_at = Some(index);
            context.emit(ConversionEvent::ProgramEndFound { line, marker: ProgramEndMarker::EndCode });
        }
    }
    (starts_here, splice_at)
}

fn with_comment(code: String, comment: &str) -> String {
    if !code.is_empty() && !comment.is_empty() {
        format!("{} {}", code, comment)
    } else {
        code + comment
    }
}

/// Rewrites one input line, returning the output lines it becomes.
pub fn convert_line(
    config: &ConversionConfiguration,
    context: &mut ConversionContext,
    line: usize,
    input: &str,
    timestamp: &str,
) -> ConversionResult<Vec<String>> {
    let mut source = SourceLine::split(input);
    let feed_words = context.modal.scan_feed(&mut source, line)?;
    let mut events = Vec::new();
    let modal_result = context.modal.scan_modal_codes(config, &mut source, line, &mut events);
    for event in events {
        context.emit(event);
    }
    modal_result?;
    let rotary_bearing = process_movement(config, context, &mut source, line)?
        .map_or(false, |outcome| outcome.rotary_bearing);
    let (starts_here, splice_at) = scan_program_boundaries(context, &source, line);

    let mut output = Vec::new();
    let (before_end, mut code) = match splice_at {
        Some(index) => (source.words[..index].join(" "), source.words[index..].join(" ")),
        None => (String::new(), source.words.join(" ")),
    };
    if splice_at.is_some() {
        if !before_end.is_empty() {
            output.push(before_end);
        }
        output.extend(program_end_block(context.modal.feed_rate));
    }
    if config.wraps_rotary_moves() && !rotary_bearing && !feed_words.is_empty() {
        code = std::iter::once(code).chain(feed_words).filter(|word| !word.is_empty()).join(" ");
    }
    output.push(with_comment(code, source.comment));

    if starts_here {
        output.extend(preamble(config, timestamp));
        context.emit(ConversionEvent::PreambleAdded { line });
    }
    if config.wraps_rotary_moves() && rotary_bearing {
        output = wrap_in_inverse_time(output, context.modal.feed_rate);
    }
    Ok(output)
}

/// Drives a whole run: feed it lines in order, then `finish` it for the statistics.
pub struct Converter {
    config: ConversionConfiguration,
    context: ConversionContext,
    lines_processed: usize,
    timestamp: String,
}
impl Converter {
    pub fn new(config: ConversionConfiguration) -> Self {
        Self {
            config,
            context: ConversionContext::default(),
            lines_processed: 0,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
    /// Overrides the time written into the preamble.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
    pub fn process_line(&mut self, input: &str) -> ConversionResult<Vec<String>> {
        self.lines_processed += 1;
        convert_line(&self.config, &mut self.context, self.lines_processed, input, &self.timestamp)
    }
    pub fn finish(mut self) -> ConversionSummary {
        if !self.context.modal.program_ended {
            self.context.emit(ConversionEvent::MissingProgramEnd);
        }
        ConversionSummary {
            config: self.config,
            statistics: self.context.statistics,
            events: self.context.events,
            lines_processed: self.lines_processed,
        }
    }
    pub fn convert_all<'a>(mut self, lines: impl IntoIterator<Item = &'a str>) -> ConversionResult<ConvertedProgram> {
        let mut output = String::new();
        for line in lines {
            for output_line in self.process_line(line)? {
                output.push_str(&output_line);
                output.push('\n');
            }
        }
        Ok(ConvertedProgram { output, summary: self.finish() })
    }
}

#[derive(Clone, Debug)]
pub struct ConversionSummary {
    pub config: ConversionConfiguration,
    pub statistics: Statistics,
    /// Every event of the run in processing order, ending with any end-of-run warning.
    pub events: Vec<ConversionEvent>,
    pub lines_processed: usize,
}
impl ConversionSummary {
    pub fn report(&self) -> Report<'_> {
        Report { statistics: &self.statistics, mode: self.config.conversion_mode }
    }
    pub fn advisories(&self) -> Vec<Advisory> {
        self.statistics.advisories(self.config.conversion_mode)
    }
}

#[derive(Clone, Debug)]
pub struct ConvertedProgram {
    pub output: String,
    pub summary: ConversionSummary,
}

#[cfg(test)]
mod test {
    use crate::{config::ConversionMode, coordinates::ArcPlane};

    use super::*;

    fn established_context() -> ConversionContext {
        let mut context = ConversionContext::default();
        context.modal.feed_rate = Some(10.0);
        context.modal.feed_mode_set = true;
        context.modal.plane_set = true;
        context.modal.absolute_mode_set = true;
        context.modal.last_motion = Some(MotionCode::Linear);
        context.last_position = AxisCoordinate::default()
            .with(Axis::X, 0.0)
            .with(Axis::Y, 0.0)
            .with(Axis::Z, 1.0)
            .with(Axis::A, 0.0);
        context
    }

    #[test]
    fn test_convert_line_in_isolation() {
        let config = ConversionConfiguration::default();
        let mut context = established_context();
        let lines = convert_line(&config, &mut context, 12, "Y5 A90 (side)", "").unwrap();
        // sqrt(25 + (PI / 2)^2) = 5.24094 inches at 10 per minute.
        assert_eq!(lines, vec!["Y5 A90 F1.90806 (side)"]);
        assert_eq!(context.last_position.get(Axis::Y), Some(5.0));
        assert_eq!(context.statistics.rotary_range, Some((90.0, 90.0)));
        assert_eq!(context.statistics.linear_lines, 1);
    }
    #[test]
    fn test_rapid_moves_keep_their_words() {
        let config = ConversionConfiguration::default();
        let mut context = established_context();
        let lines = convert_line(&config, &mut context, 3, "G0 A45", "").unwrap();
        assert_eq!(lines, vec!["G0 A45"]);
        assert_eq!(context.modal.last_motion, Some(MotionCode::Rapid));
        assert_eq!(context.statistics.rotary_move_lines, 1);
    }
    #[test]
    fn test_plane_change_applies_to_arcs() {
        let config = ConversionConfiguration { conversion_mode: ConversionMode::WrapEachRotaryMove, ..Default::default() };
        let mut context = established_context();
        let lines = convert_line(&config, &mut context, 5, "G18 G3 X0 Z1 I2 K0", "").unwrap();
        assert_eq!(context.modal.plane, ArcPlane::ZX);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("G18 G3 X0 Z1 I2 K0"));
        assert!(context.events.contains(&ConversionEvent::PlaneFound { line: 5, plane: ArcPlane::ZX }));
    }
    #[test]
    fn test_comment_only_line() {
        let mut context = ConversionContext::default();
        let lines = convert_line(&ConversionConfiguration::default(), &mut context, 1, "(just a note)", "").unwrap();
        assert_eq!(lines, vec!["(just a note)"]);
        assert_eq!(context.statistics.motion_lines(), 0);
    }
}
