//! Result tables
//!
//! Tables are built as lines of toned segments so the same content can be
//! printed in color on the console and as plain text into the session log.

use colored::{ColoredString, Colorize};
use tracing::info;
use zst_core::{
    CheckOutcome, Latency, ProbeResult, Rating, StrategyOutcome, StrategyResult,
};

use crate::logging::REPORT_TARGET;
use crate::status_line;

const WIDTH: usize = 90;
const TARGET_WIDTH: usize = 40;
const CELL_WIDTH: usize = 10;
const NAME_WIDTH: usize = 30;

/// Color class of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Default terminal color
    Plain,
    /// Bold white
    Header,
    /// Cyan (frames and titles)
    Frame,
    /// Green
    Good,
    /// Yellow
    Warn,
    /// Red
    Bad,
    /// Blue
    Info,
}

/// A run of text with one tone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    text: String,
    tone: Tone,
}

impl Segment {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    fn colored(&self) -> ColoredString {
        let text = self.text.as_str();
        match self.tone {
            Tone::Plain => text.normal(),
            Tone::Header => text.white().bold(),
            Tone::Frame => text.cyan(),
            Tone::Good => text.green(),
            Tone::Warn => text.yellow(),
            Tone::Bad => text.red(),
            Tone::Info => text.blue(),
        }
    }
}

/// One output line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line(Vec<Segment>);

impl Line {
    /// Line made of a single segment
    pub fn of(text: impl Into<String>, tone: Tone) -> Self {
        Self(vec![Segment::new(text, tone)])
    }

    fn rule(ch: char) -> Self {
        Self::of(ch.to_string().repeat(WIDTH), Tone::Frame)
    }

    /// Append a segment
    pub fn push(mut self, text: impl Into<String>, tone: Tone) -> Self {
        self.0.push(Segment::new(text, tone));
        self
    }

    /// Text without color codes
    pub fn plain(&self) -> String {
        self.0.iter().map(|s| s.text.as_str()).collect()
    }

    /// Text with color codes
    pub fn colored(&self) -> String {
        self.0.iter().map(|s| s.colored().to_string()).collect()
    }
}

/// Print lines to the console and copy them into the session log
pub fn emit(lines: &[Line]) {
    status_line::clear();
    for line in lines {
        println!("{}", line.colored());
        info!(target: REPORT_TARGET, "{}", line.plain());
    }
}

/// Cut `text` to `width` characters, marking the cut
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn latency_tone(latency: Latency) -> Tone {
    match latency {
        Latency::Millis(ms) if ms < 50.0 => Tone::Good,
        Latency::Millis(ms) if ms < 200.0 => Tone::Warn,
        _ => Tone::Bad,
    }
}

fn check_tone(outcome: CheckOutcome) -> Tone {
    match outcome {
        CheckOutcome::Status { code, .. } if (200..400).contains(&code) => Tone::Good,
        CheckOutcome::Status { .. } => Tone::Warn,
        CheckOutcome::NotApplicable => Tone::Info,
        CheckOutcome::Failed => Tone::Bad,
    }
}

fn result_row(target: &str, result: &ProbeResult) -> Line {
    let mut line = Line::of(pad(&truncate(target, TARGET_WIDTH - 2), TARGET_WIDTH), Tone::Plain)
        .push(" ", Tone::Plain)
        .push(pad(&result.latency.to_string(), CELL_WIDTH), latency_tone(result.latency));
    for outcome in [result.http, result.tls12, result.tls13] {
        line = line
            .push(" ", Tone::Plain)
            .push(pad(&outcome.to_string(), CELL_WIDTH), check_tone(outcome));
    }
    line
}

/// Availability footer icon and tone
fn verdict(rate: f64) -> (&'static str, Tone) {
    if rate > 70.0 {
        ("✓", Tone::Good)
    } else if rate > 30.0 {
        ("⚠", Tone::Warn)
    } else {
        ("✗", Tone::Bad)
    }
}

/// Table for one evaluated strategy
pub fn strategy_table(result: &StrategyResult, reference_host: &str, max_rows: usize) -> Vec<Line> {
    let mut lines = vec![
        Line::default(),
        Line::rule('='),
        Line::of(format!("STRATEGY RESULTS: {}", result.name), Tone::Frame),
    ];

    match &result.outcome {
        StrategyOutcome::ApplyFailed(reason) => {
            lines.push(Line::of(format!("Failed to apply strategy, skipped: {reason}"), Tone::Bad));
            lines.push(Line::rule('='));
            return lines;
        }
        StrategyOutcome::BaselineFailed => {
            lines.push(Line::of(
                format!("{reference_host} is unreachable, strategy skipped"),
                Tone::Bad,
            ));
            lines.push(Line::rule('='));
            return lines;
        }
        StrategyOutcome::Scored | StrategyOutcome::Interrupted => {}
    }

    if let Latency::Millis(ms) = result.baseline {
        let tone = if ms < 50.0 { Tone::Good } else { Tone::Warn };
        lines.push(
            Line::of(format!("Baseline latency ({reference_host}): "), Tone::Frame)
                .push(format!("{ms:.1}ms"), tone),
        );
    }

    lines.push(Line::rule('='));
    lines.push(Line::of(
        format!(
            "{:<TARGET_WIDTH$} {:<CELL_WIDTH$} {:<CELL_WIDTH$} {:<CELL_WIDTH$} {:<CELL_WIDTH$}",
            "Target", "Ping", "HTTP", "TLS1.2", "TLS1.3"
        ),
        Tone::Header,
    ));
    lines.push(Line::rule('-'));

    let rows: Vec<Line> = result
        .results
        .iter()
        .map(|(target, probe)| result_row(target.as_str(), probe))
        .collect();

    if rows.len() > max_rows {
        let head = max_rows * 2 / 3;
        let tail = max_rows - head;
        lines.extend_from_slice(&rows[..head]);
        lines.push(Line::of(
            format!("... {} results omitted ...", rows.len() - head - tail),
            Tone::Warn,
        ));
        lines.extend_from_slice(&rows[rows.len() - tail..]);
    } else {
        lines.extend(rows);
    }

    lines.push(Line::rule('-'));

    if result.aborted {
        let note = match result.outcome {
            StrategyOutcome::Interrupted => "Interrupted by user",
            _ => "Stopped early: strategy cannot beat the best result",
        };
        lines.push(Line::of(note, Tone::Warn));
    }

    let rate = result.success_rate();
    let (icon, tone) = verdict(rate);
    lines.push(
        Line::of(format!("{icon} Available: "), tone)
            .push(format!("{}/{}", result.available, result.total), tone)
            .push(format!(" targets ({rate:.1}%)"), Tone::Header),
    );
    lines.push(Line::rule('='));
    lines
}

fn rating_tone(rating: Rating) -> Tone {
    match rating {
        Rating::Best | Rating::Excellent => Tone::Good,
        Rating::Good | Rating::Fair => Tone::Warn,
        Rating::Poor => Tone::Bad,
    }
}

/// Final summary of ranked strategies, limited to `top`
pub fn summary_table(ranked: &[&StrategyResult], top: usize) -> Vec<Line> {
    let mut lines = vec![
        Line::default(),
        Line::rule('='),
        Line::of("SUMMARY OF ALL STRATEGIES", Tone::Frame),
        Line::rule('='),
        Line::of(
            format!(
                "{:<3} {:<NAME_WIDTH$} {:>10} {:>8} {:>12} {:<10}",
                "#", "Strategy", "Available", "%", "Baseline", "Rating"
            ),
            Tone::Header,
        ),
        Line::rule('-'),
    ];

    for (index, result) in ranked.iter().take(top).enumerate() {
        let rank = index + 1;
        let rate = result.success_rate();
        let rating = Rating::classify(rank, rate);
        let tone = rating_tone(rating);
        let baseline = match result.baseline {
            Latency::Millis(ms) => format!("{ms:.1}ms"),
            Latency::Failed => "N/A".to_string(),
        };

        lines.push(
            Line::of(format!("{rank:<3} "), tone)
                .push(
                    format!("{:<NAME_WIDTH$} ", truncate(&result.name, NAME_WIDTH - 2)),
                    tone,
                )
                .push(format!("{:>10} ", result.available), tone)
                .push(format!("{rate:>7.1}% "), tone)
                .push(format!("{baseline:>12} "), Tone::Plain)
                .push(format!("{:<10}", rating.as_str()), tone),
        );
    }

    if ranked.len() > top {
        lines.push(Line::rule('-'));
        lines.push(Line::of(
            format!("Showing top {top} of {} strategies", ranked.len()),
            Tone::Warn,
        ));
    }
    lines
}
