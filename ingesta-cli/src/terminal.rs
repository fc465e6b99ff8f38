// ============================================================================
// ingesta-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Sectioned, lightly colored output for the CLI. Everything is emitted
// through the `log` facade so it lands in the run log as well as on the
// console; errors are written straight to stderr because they may occur
// before the logger exists.
//
// Visual hierarchy:
// 1. Sections (===== SECTION =====)
// 2. Processing steps (» Step description)
// 3. Status items (  Label:          Value)
// 4. Success / warning lines (✓ ... / ! ...)

use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};
use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

use crate::logging::RUN_LOG_TARGET;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const WARNING_SYMBOL: &str = "!";
    pub const PROCESSING_SYMBOL: &str = "»";
    pub const ERROR_SYMBOL: &str = "✗";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
    /// Labels are padded to this display width.
    pub const STATUS_LABEL_WIDTH: usize = 16;

    pub const EMPTY_LINE: &str = "";
}

static USE_COLOR: AtomicBool = AtomicBool::new(true);

/// Set whether to use color in terminal output
pub fn set_color(enable: bool) {
    USE_COLOR.store(enable, Ordering::Relaxed);
}

fn should_use_color() -> bool {
    USE_COLOR.load(Ordering::Relaxed)
}

/// Decides whether stdout should be colored.
///
/// `--no-color` and `NO_COLOR` always win; otherwise color is used when the
/// terminal supports it.
pub fn color_enabled(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("{}", styling::EMPTY_LINE);
    let title = title.to_uppercase();
    if should_use_color() {
        info!(
            "{}{}{}",
            styling::SECTION_PREFIX,
            title.cyan().bold(),
            styling::SECTION_SUFFIX
        );
    } else {
        info!("{}{}{}", styling::SECTION_PREFIX, title, styling::SECTION_SUFFIX);
    }
    info!("{}", styling::EMPTY_LINE);
}

/// Pads a label so values line up, measuring display width rather than bytes.
fn padded_label(label: &str) -> String {
    let width = UnicodeWidthStr::width(label) + 1;
    let padding = styling::STATUS_LABEL_WIDTH.saturating_sub(width).max(1);
    format!("{}:{}", label, " ".repeat(padding))
}

/// Print a status line (key-value pair)
///
/// # Arguments
///
/// * `label` - The label for the status line
/// * `value` - The value to display
/// * `highlight` - Whether to emphasize the value
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label = padded_label(label);
    if should_use_color() && highlight {
        info!("{}{}{}", styling::STATUS_INDENT, label, value.bold());
    } else {
        info!("{}{}{}", styling::STATUS_INDENT, label, value);
    }
}

/// Print a processing step message
pub fn print_processing(message: &str) {
    if should_use_color() {
        info!("{} {}", styling::PROCESSING_SYMBOL, message.bold());
    } else {
        info!("{} {}", styling::PROCESSING_SYMBOL, message);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    if should_use_color() {
        info!("{} {}", styling::SUCCESS_SYMBOL.green(), message);
    } else {
        info!("{} {}", styling::SUCCESS_SYMBOL, message);
    }
}

/// Print a warning that does not stop the run
pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("{} {}", styling::WARNING_SYMBOL.yellow().bold(), message.yellow());
    } else {
        info!("{} {}", styling::WARNING_SYMBOL, message);
    }
}

/// Print an error message with context
///
/// # Arguments
///
/// * `title` - The error title
/// * `message` - The error message
/// * `suggestion` - Optional suggestion for fixing the error
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    let colored = console::colors_enabled_stderr() && should_use_color();
    if colored {
        eprintln!("{} {}", styling::ERROR_SYMBOL, title.red().bold());
    } else {
        eprintln!("{} {}", styling::ERROR_SYMBOL, title);
    }
    eprintln!();
    eprintln!("  Message:  {}", message);
    if let Some(suggestion_text) = suggestion {
        eprintln!();
        eprintln!("  Suggestion: {}", suggestion_text);
    }
    eprintln!();

    error!(target: RUN_LOG_TARGET, "{}: {}", title, message);
}
