//! Output functions for consistent CLI formatting
//!
//! Buildpack output ends up in platform build logs, so everything is plain
//! line-oriented text with optional colour.

use console::style;

/// Display a section header
pub fn section(title: &str) {
    println!("{}", style(title).cyan().bold());
}

/// Display a success step with detail
pub fn step_ok_detail(message: &str, detail: &str) {
    println!("  {} {} ({})", style("[OK]").green(), message, style(detail).dim());
}

/// Display an info step
pub fn step_info(message: &str) {
    println!("  {} {}", style("[INFO]").cyan(), message);
}

/// Display a warning step with hint
pub fn step_warn_hint(message: &str, hint: &str) {
    println!("  {} {} - {}", style("[WARN]").yellow(), message, hint);
}

/// Print a key-value pair
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}
