//! Log formatting and console output with ANSI colors
//!
//! Handles:
//! - Colorized tag and level columns
//! - Continuation lines for multi-line messages
//! - Broken pipe handling for piped commands

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const LOG_TYPE_WIDTH: usize = 8;

/// Format and output a log message
pub fn format_and_log(tag: &LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();
    let prefix = format!("{} ", time).dimmed().to_string();

    let base_line = format!("{}[{}] [{}] ", prefix, format_tag(tag), format_level(level));
    let continuation = " ".repeat(time.len() + 1 + TAG_WIDTH + LOG_TYPE_WIDTH + 6);

    for (index, line) in message.split('\n').enumerate() {
        if index == 0 {
            print_stdout_safe(&format!("{}{}", base_line, line));
        } else {
            print_stdout_safe(&format!("{}{}", continuation, line));
        }
    }
}

/// Format a tag with appropriate color
fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.label(), width = TAG_WIDTH);
    match tag {
        LogTag::System => padded.bright_yellow().bold(),
        LogTag::Config => padded.yellow().bold(),
        LogTag::Api => padded.bright_purple().bold(),
        LogTag::Market => padded.bright_cyan().bold(),
        LogTag::Buy => padded.bright_green().bold(),
        LogTag::Sessions => padded.bright_blue().bold(),
        LogTag::Bot => padded.bright_magenta().bold(),
        LogTag::Webserver => padded.green().bold(),
    }
}

/// Format log level with appropriate color
fn format_level(level: LogLevel) -> ColoredString {
    let padded = format!("{:<width$}", level.as_str(), width = LOG_TYPE_WIDTH);
    match level {
        LogLevel::Error => padded.bright_red().bold(),
        LogLevel::Warning => padded.bright_yellow().bold(),
        LogLevel::Debug | LogLevel::Verbose => padded.dimmed(),
        LogLevel::Info => padded.white().bold(),
    }
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    if let Err(e) = stdout().flush() {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}
