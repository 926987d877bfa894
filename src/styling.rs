//! Terminal styling for status output.
//!
//! Uses `anstream` for auto-detecting color support on stdout/stderr,
//! `anstyle` for composable [`Style`](anstyle::Style) values used where a
//! computed style is needed at runtime (edge colors keyed by
//! [`EdgeStatus`](crate::sync_status::EdgeStatus)), and `color-print`'s
//! `cformat!` for one-off user-facing messages.
//!
//! Renders plain colored text with no emoji.

use anstyle::{AnsiColor, Color, Style};

// Re-exports from anstream (auto-detecting output) and anstyle.
pub use anstream::{eprintln, println};
pub use anstyle::Style as AnstyleStyle;

/// Edge color for an in-sync parent/child relationship.
pub const GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
/// Edge color for a fork-point-off-but-ancestor relationship.
pub const YELLOW: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
/// Edge color for an out-of-sync relationship.
pub const RED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
/// Edge color (dim) for a branch merged into its parent.
pub const DIM: Style = Style::new().dimmed();
/// Style for the currently checked-out branch.
pub const BOLD: Style = Style::new().bold();
/// Style for underlined text (current branch name).
pub const UNDERLINE: Style = Style::new().underline();

/// Whether to render the tree with ASCII-only junctions/arrows.
///
/// Mirrors the upstream `ASCII_ONLY` environment variable (also exported to
/// the `machete-status-branch` hook) and the `--color` CLI
/// option's `never` value.
pub fn ascii_only() -> bool {
    std::env::var("ASCII_ONLY")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
        || !supports_color()
}

fn supports_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    anstream::stdout().is_terminal() || std::env::var("FORCE_COLOR").is_ok()
}

/// Apply `status --color=<always|never|auto>` (renderer color
/// decision) by setting the same `NO_COLOR`/`FORCE_COLOR` env vars the
/// auto-detection above already honors; `auto` leaves the terminal's own
/// detection in charge.
#[allow(unsafe_code)]
pub fn apply_color_mode(mode: &str) {
    match mode {
        "always" => unsafe { std::env::set_var("FORCE_COLOR", "1") },
        "never" => unsafe { std::env::set_var("NO_COLOR", "1") },
        _ => {}
    }
}

use std::io::IsTerminal;

/// Wrap `text` in `style`, honoring the global color decision.
pub fn styled(text: &str, style: Style) -> String {
    if supports_color() {
        format!("{style}{text}{style:#}")
    } else {
        text.to_string()
    }
}

pub fn bold(text: &str) -> String {
    styled(text, BOLD)
}

pub fn dim(text: &str) -> String {
    styled(text, DIM)
}

pub fn underline(text: &str) -> String {
    styled(text, UNDERLINE)
}
