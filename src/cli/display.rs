//! Terminal display for cycles
//!
//! Renders the current cycle, the countdown and the history as
//! human-readable, colored output. Progress goes to stderr so stdout stays
//! clean for piping; history and status go to stdout.

use std::io::Write as _;

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

use crate::cycle::model::{Cycle, CycleStatus};
use crate::ticker::{Countdown, TickOutcome};

/// Display handler for a watched cycle
pub struct CycleDisplay {
    task: String,
}

impl CycleDisplay {
    /// Create a display for the cycle working on `task`
    #[must_use]
    pub fn new(task: &str) -> Self {
        Self {
            task: task.to_string(),
        }
    }

    /// Print the header at the start of a watch
    pub fn print_header(&self) {
        eprintln!(
            "\n{} {}",
            "===".bold().cyan(),
            format!("Focus: {}", truncate(&self.task, 60)).bold().cyan()
        );
        eprintln!("{}", "─".repeat(50).dimmed());
    }

    /// Render one tick, rewriting the countdown line in place
    pub fn render_tick(&self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::Running(countdown) => {
                eprint!("\r  {} {}  ", "⏱".blue(), format_countdown(countdown).bold());
                let _ = std::io::stderr().flush();
            }
            TickOutcome::Finished(_) => {
                eprintln!("\r  {} {}    ", "✓".green().bold(), "00:00".bold());
                eprintln!("{}", "─".repeat(50).dimmed());
                eprintln!("  {} {}", "FINISHED".green().bold(), self.task.bold());
            }
            TickOutcome::Idle => {
                eprintln!();
                eprintln!("  {}", "No cycle is running".dimmed());
            }
        }
    }
}

/// Countdown with its progress, e.g. `24:18 (42s of 25m)`
#[must_use]
pub fn format_countdown(countdown: &Countdown) -> String {
    format!(
        "{countdown} ({}s of {}m)",
        countdown.seconds_passed,
        countdown.total_seconds / 60
    )
}

/// Plain label for a cycle status
#[must_use]
pub const fn status_text(status: CycleStatus) -> &'static str {
    match status {
        CycleStatus::InProgress => "in progress",
        CycleStatus::Finished => "finished",
        CycleStatus::Interrupted => "interrupted",
    }
}

/// Colored label for a cycle status
#[must_use]
pub fn status_label(status: CycleStatus) -> ColoredString {
    let text = status_text(status);
    match status {
        CycleStatus::InProgress => text.yellow(),
        CycleStatus::Finished => text.green(),
        CycleStatus::Interrupted => text.red(),
    }
}

/// Rough age of an instant relative to `now`, e.g. `5 minutes ago`
#[must_use]
pub fn format_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let (amount, unit) = match secs {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s => (s / 86_400, "day"),
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// One history row: task, duration, start, status
#[must_use]
pub fn format_history_row(cycle: &Cycle, now: DateTime<Utc>) -> String {
    format!(
        "{:<40} {:>4}m  {:<16} {}",
        truncate(&cycle.task, 40),
        cycle.minutes_amount,
        format_ago(cycle.start_time, now),
        status_label(cycle.status())
    )
}

/// Print the cycle history, newest first
pub fn render_history(cycles: &[Cycle], now: DateTime<Utc>) {
    if cycles.is_empty() {
        println!("{}", "No cycles yet".dimmed());
        return;
    }

    println!(
        "{}",
        format!("{:<40} {:>5}  {:<16} {}", "Task", "Time", "Started", "Status").bold()
    );
    for cycle in cycles.iter().rev() {
        println!("{}", format_history_row(cycle, now));
    }
}

/// Print the active cycle with its countdown, or a hint when idle
pub fn render_status(active: Option<&Cycle>, countdown: Option<&Countdown>) {
    match (active, countdown) {
        (Some(cycle), Some(countdown)) => {
            println!(
                "{} {}",
                "Working on".dimmed(),
                truncate(&cycle.task, 60).bold()
            );
            println!("  {} {}", "⏱".blue(), format_countdown(countdown).bold());
        }
        _ => println!("{}", "No cycle is running".dimmed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_test_cycle, t0};
    use chrono::Duration;

    #[test]
    fn test_new_display() {
        let display = CycleDisplay::new("Write report");
        assert_eq!(display.task, "Write report");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(
            format_countdown(&Countdown::new(1500, 42)),
            "24:18 (42s of 25m)"
        );
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(CycleStatus::InProgress), "in progress");
        assert_eq!(status_text(CycleStatus::Finished), "finished");
        assert_eq!(status_text(CycleStatus::Interrupted), "interrupted");
    }

    #[test]
    fn test_format_ago() {
        assert_eq!(format_ago(t0(), t0() + Duration::seconds(30)), "just now");
        assert_eq!(format_ago(t0(), t0() + Duration::minutes(1)), "1 minute ago");
        assert_eq!(format_ago(t0(), t0() + Duration::minutes(45)), "45 minutes ago");
        assert_eq!(format_ago(t0(), t0() + Duration::hours(3)), "3 hours ago");
        assert_eq!(format_ago(t0(), t0() + Duration::days(2)), "2 days ago");
        // Clock skew reads as "just now"
        assert_eq!(format_ago(t0(), t0() - Duration::minutes(5)), "just now");
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("Write report", 40), "Write report");
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "a".repeat(100);
        let result = truncate(&long, 20);
        assert_eq!(result.chars().count(), 20);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "Relatório mensal de atividades";
        let result = truncate(text, 12);
        assert_eq!(result, "Relatório...");
    }

    #[test]
    fn test_history_row_contains_fields() {
        let cycle = make_test_cycle("a", "Write report", 25);
        let row = format_history_row(&cycle, t0() + Duration::minutes(10));

        assert!(row.contains("Write report"));
        assert!(row.contains("25m"));
        assert!(row.contains("10 minutes ago"));
        assert!(row.contains("in progress"));
    }

    // Rendering must not panic for any outcome or state
    #[test]
    fn test_render_no_panic() {
        let display = CycleDisplay::new("Write report");
        display.print_header();
        display.render_tick(&TickOutcome::Running(Countdown::new(1500, 1)));
        display.render_tick(&TickOutcome::Finished("a".into()));
        display.render_tick(&TickOutcome::Idle);

        let cycle = make_test_cycle("a", "Write report", 25);
        render_history(&[], t0());
        render_history(std::slice::from_ref(&cycle), t0());
        render_status(None, None);
        render_status(Some(&cycle), Some(&Countdown::new(1500, 0)));
    }
}
