//! Rewrites 4-axis (X, Y, Z, A) G-code from units-per-minute feed (G94) into inverse time
//! feed (G93), so that moves combining linear and rotary motion keep a constant tangential speed.

use config::ConversionConfiguration;
use convert::{ConvertedProgram, Converter};
use error::ConversionResult;

pub mod classify;
pub mod config;
pub mod convert;
pub mod coordinates;
pub mod error;
pub mod events;
pub mod modal;
pub mod output;
pub mod parse;
pub mod statistics;

pub fn convert_gcode_file(
    config: &ConversionConfiguration,
    input: &str,
) -> ConversionResult<ConvertedProgram> {
    Converter::new(config.clone()).convert_all(input.lines())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{PI, TAU};

    use crate::{
        config::{ConversionMode, Units},
        error::{ErrorKind, Precondition},
        events::{ConversionEvent, ProgramEndMarker},
        modal::WHOLE_FILE_FEED_MODE_WORD,
        statistics::Advisory,
    };

    use super::*;

    fn convert_with(config: ConversionConfiguration, input: &str) -> ConversionResult<ConvertedProgram> {
        Converter::new(config).with_timestamp("2020-Jan-01 00:00:00").convert_all(input.lines())
    }
    fn convert(input: &str) -> ConversionResult<ConvertedProgram> {
        convert_with(ConversionConfiguration::default(), input)
    }
    fn output_lines(program: &ConvertedProgram) -> Vec<&str> {
        program.output.lines().collect()
    }
    fn is_close(lhs: f64, rhs: f64) -> bool {
        (lhs - rhs).abs() < 1e-4
    }

    #[test]
    fn it_works() {
        let program = convert(
            "G90 G17 G94
            G0 X0 Y0 Z0
            G01 X1 Y1 F10"
        ).unwrap();
        assert_eq!(output_lines(&program), vec![
            format!("G90 G17 {}", WHOLE_FILE_FEED_MODE_WORD).as_str(),
            "G0 X0 Y0 Z0",
            "G01 X1 Y1 F7.07107",
        ]);
        let statistics = &program.summary.statistics;
        assert_eq!((statistics.rapid_lines, statistics.linear_lines), (1, 1));
        assert!(is_close(statistics.total_distance, 2.0_f64.sqrt()));
    }
    #[test]
    fn test_wrapped_rotary_moves() {
        let config = ConversionConfiguration {
            conversion_mode: ConversionMode::WrapEachRotaryMove,
            feed_precision: 3,
            ..Default::default()
        };
        let program = convert_with(config, "G90 G17 G94 F20
            G0 X0 Y0 Z1 A0
            G1 X2
            G1 A90 (turn)
            M30").unwrap();
        assert_eq!(output_lines(&program), vec![
            "G90 G17 G94 F20",
            "G0 X0 Y0 Z1 A0",
            "G1 X2",
            "G93",
            "G1 A90 F12.732 (turn)",
            "G94",
            "F20.0",
            "G94 (Added to revert back to standard G94 feed rate mode)",
            "F20.0 (last feed rate used)",
            "M30",
        ]);
        let statistics = &program.summary.statistics;
        assert_eq!(statistics.rotary_move_lines, 2);
        assert_eq!(statistics.rotary_range, Some((0.0, 90.0)));
        assert!(is_close(statistics.total_distance, 2.0 + PI / 2.0));
        assert!(is_close(statistics.total_degrees, 90.0));
        assert!(!program.summary.events.contains(&ConversionEvent::MissingProgramEnd));
    }
    #[test]
    fn test_wrapping_keeps_ordinary_feed() {
        let config = ConversionConfiguration { conversion_mode: ConversionMode::WrapEachRotaryMove, ..Default::default() };
        let program = convert_with(config, "G90 G17 G94\nG0 X0 Y0 Z0\nG1 X1 F30").unwrap();
        assert_eq!(output_lines(&program)[2], "G1 X1 F30");
    }
    #[test]
    fn test_program_boundaries() {
        let program = convert(
            "%
            G90 G17 G94 F10
            G0 X0 Y0 Z0
            G1 X3 Y4
            %"
        ).unwrap();
        let lines = output_lines(&program);
        assert_eq!(lines.len(), 1 + 11 + 6);
        assert_eq!(lines[0], "%");
        assert!(lines[6].contains("2020-Jan-01 00:00:00"));
        assert_eq!(&lines[12..], &[
            format!("G90 G17 {}", WHOLE_FILE_FEED_MODE_WORD).as_str(),
            "G0 X0 Y0 Z0",
            "G1 X3 Y4 F2.00000",
            "G94 (Added to revert back to standard G94 feed rate mode)",
            "F10.0 (last feed rate used)",
            "%",
        ]);
        let events = &program.summary.events;
        assert!(events.contains(&ConversionEvent::ProgramStartFound { line: 1 }));
        assert!(events.contains(&ConversionEvent::PreambleAdded { line: 1 }));
        assert!(events.contains(&ConversionEvent::ProgramEndFound { line: 5, marker: ProgramEndMarker::Percent }));
    }
    #[test]
    fn test_preamble_inside_wrapped_move() {
        let config = ConversionConfiguration { conversion_mode: ConversionMode::WrapEachRotaryMove, ..Default::default() };
        let program = convert_with(config, "G90 G17 G94 F20\nG0 X0 Y0 Z1 A0\n% G1 A90").unwrap();
        let lines = output_lines(&program);
        assert_eq!(lines.len(), 2 + 2 + 11 + 2);
        assert_eq!(&lines[2..4], &["G93", "% G1 A90 F12.73240"]);
        assert!(lines[4..15].iter().all(|line| line.starts_with('(')));
        assert!(lines[9].contains("2020-Jan-01 00:00:00"));
        assert_eq!(&lines[15..], &["G94", "F20.0"]);
        assert!(program.summary.events.contains(&ConversionEvent::PreambleAdded { line: 3 }));
    }
    #[test]
    fn test_terminator_on_move_line() {
        let program = convert("G90 G17 G94 F10\nG0 X0\nG1 X5 M30").unwrap();
        // The inverse time feed stays with the words that follow the restorative block.
        assert_eq!(&output_lines(&program)[2..], &[
            "G1 X5",
            "G94 (Added to revert back to standard G94 feed rate mode)",
            "F10.0 (last feed rate used)",
            "M30 F2.00000",
        ]);
    }
    #[test]
    fn test_report_with_advisory() {
        let mut input = String::from("G90 G17 G94 F10\nG0 X0 Y0 Z0 A0\n");
        for x in 1..=60 {
            input.push_str(&format!("G1 X{}\n", x));
        }
        input.push_str("G1 A10\nM30\n");
        let program = convert(&input).unwrap();
        let summary = &program.summary;
        assert_eq!(summary.advisories(), vec![Advisory::PreferWrapping]);
        let report = summary.report().to_string();
        assert!(report.contains("Number of G01 lines: 61"));
        assert!(report.contains("Total G00+G01+G02+G03 lines: 62"));
        assert!(report.contains("Number lines with rotary moves: 2  (3%)"));
        assert!(report.contains("Rotary (A-axis) Min/Max rotations: 0, 10"));
        assert!(report.ends_with(&Advisory::PreferWrapping.to_string()));
        assert!(report.contains("'Wrap each rotary move in G93' option"));
    }
    #[test]
    fn test_restorative_block_splits_line() {
        let program = convert("G90 G17 G94 F12.5\nG0 X0 M2 (done)").unwrap();
        assert_eq!(&output_lines(&program)[1..], &[
            "G0 X0",
            "G94 (Added to revert back to standard G94 feed rate mode)",
            "F12.5 (last feed rate used)",
            "M2 (done)",
        ]);
    }
    #[test]
    fn test_missing_program_end() {
        let program = convert(
            "G90 G17 G94 F10
            G0 X0 Y0 Z0 A0
            G1 X3 Y4
            G1 A45"
        ).unwrap();
        let warnings = program.summary.events.iter().filter(|event| **event == ConversionEvent::MissingProgramEnd).count();
        assert_eq!(warnings, 1);
        let statistics = &program.summary.statistics;
        assert_eq!(statistics.motion_lines(), 3);
        assert_eq!(statistics.rotary_move_lines, 2);
        assert!(is_close(statistics.total_distance, 5.0 + 0.25 * PI / 4.0));
    }
    #[test]
    fn test_full_circle_arc() {
        let program = convert(
            "G90 G17 G94 F10
            G0 X0 Y0
            G2 X0 Y0 I5 J0
            X0 Y0 I5 J0"
        ).unwrap();
        let lines = output_lines(&program);
        assert_eq!(lines[2], "G2 X0 Y0 I5 J0 F0.31831");
        assert_eq!(lines[3], "X0 Y0 I5 J0 F0.31831");
        assert_eq!(program.summary.statistics.clockwise_lines, 2);
        assert!(is_close(program.summary.statistics.total_distance, 2.0 * TAU * 5.0));
    }
    #[test]
    fn test_zero_length_move_warns() {
        let program = convert("G90 G17 G94 F10\nG0 X1 Y1\nG1 X1 Y1").unwrap();
        assert_eq!(output_lines(&program)[2], "G1 X1 Y1 F0.00000");
        assert!(program.summary.events.contains(&ConversionEvent::ZeroInverseFeed { line: 3 }));
    }
    #[test]
    fn test_inverse_time_in_source() {
        let error = convert("G90 G17 G94 F10\nG0 X0\nN30 G93 G1 X5 (cut)").unwrap_err();
        assert_eq!(error, ErrorKind::InverseTimeInSource.at_line(3));
    }
    #[test]
    fn test_output_cannot_be_reconverted() {
        let program = convert("G90 G17 G94 F10\nG0 X0\nG1 X5").unwrap();
        let error = convert(&program.output).unwrap_err();
        assert_eq!(error, ErrorKind::InverseTimeInSource.at_line(1));
    }
    #[test]
    fn test_implicit_move_without_motion_code() {
        let error = convert("G90 G17 G94 F10\n(setup)\nX1 Y1").unwrap_err();
        assert_eq!(error, ErrorKind::NoPriorMotionCode.at_line(3));
    }
    #[test]
    fn test_preconditions() {
        let error = convert("G0 X0 Y0\nG1 X1 F5").unwrap_err();
        assert_eq!(
            error,
            ErrorKind::PreconditionsNotMet(vec![Precondition::Plane, Precondition::AbsoluteMode, Precondition::FeedMode]).at_line(2)
        );
    }
    #[test]
    fn test_non_positive_feed() {
        let error = convert("G90 G17 G94 F0\nG0 X0\nG1 X1").unwrap_err();
        assert_eq!(error, ErrorKind::NonPositiveFeedRate.at_line(3));
    }
    #[test]
    fn test_millimeter_rotary_floor() {
        let config = ConversionConfiguration { units: Units::Millimeters, feed_precision: 4, ..Default::default() };
        let program = convert_with(config, "G90 G17 G94 F100\nG0 X0 Y0 Z0 A0\nG1 A90").unwrap();
        // 6.35mm floor radius: 6.35 * PI / 2 = 9.9746mm at 100mm/min.
        assert_eq!(output_lines(&program)[2], "G1 A90 F10.0255");
    }
}
