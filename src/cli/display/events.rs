//! Line-oriented rendering of stack events and diffs

use super::{colors::table_color_to_colored_str, ColorTheme, StatusIcon};
use crate::domain::stack::{EventSink, StackEvent};
use colored::Colorize;

/// Prints each released event as one line on stdout.
pub struct EventPrinter {
    theme: ColorTheme,
    printed: usize,
}

impl Default for EventPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPrinter {
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
            printed: 0,
        }
    }

    /// Number of events printed so far
    pub fn printed(&self) -> usize {
        self.printed
    }

    /// Uncolored line: timestamp, logical id, type, status, reason
    pub fn format_event_line(event: &StackEvent) -> String {
        let mut line = format!(
            "{}  {:<32} {:<40} {} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.logical_resource_id,
            event.resource_type,
            StatusIcon::get_status_icon(&event.resource_status),
            event.resource_status,
        );
        if let Some(ref reason) = event.resource_status_reason {
            line.push_str("  ");
            line.push_str(reason);
        }
        line
    }
}

impl EventSink for EventPrinter {
    fn emit(&mut self, event: &StackEvent) {
        let color = self.theme.get_status_color(&event.resource_status);
        let line = Self::format_event_line(event);
        println!("{}", line.color(table_color_to_colored_str(color)));
        self.printed += 1;
    }

    fn initiated(&mut self, operation: &str, stack: &str) {
        println!(
            "{} {} initiated for stack {}",
            StatusIcon::SUCCESS.green(),
            operation,
            stack
        );
    }
}

/// Color `+`/`-` lines of a unified diff.
pub fn render_diff(diff: &str) -> String {
    diff.lines()
        .map(|line| {
            if line.starts_with("+++") || line.starts_with("---") {
                line.bold().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
