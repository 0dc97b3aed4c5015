// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal styling for help and command output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use anstyle::{Ansi256Color, Color, Style};
use clap::builder::styling::Styles;

/// ANSI 256-color codes.
mod codes {
    pub const HEADER: u8 = 74;
    pub const LITERAL: u8 = 250;
    pub const CONTEXT: u8 = 245;
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg(code: u8) -> Style {
    Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))))
}

/// Clap styles for help output.
pub fn help_styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(fg(codes::HEADER))
        .usage(fg(codes::HEADER))
        .literal(fg(codes::LITERAL))
        .placeholder(fg(codes::CONTEXT))
        .valid(fg(codes::CONTEXT))
}

/// Field label in `info` output, e.g. `Lines:`.
pub fn label(text: &str) -> String {
    paint(fg(codes::HEADER), text, should_colorize())
}

/// Secondary detail, e.g. a `(stale)` marker.
pub fn context(text: &str) -> String {
    paint(fg(codes::CONTEXT), text, should_colorize())
}

fn paint(style: Style, text: &str, enabled: bool) -> String {
    if enabled {
        format!("{style}{text}{style:#}")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "style_tests.rs"]
mod tests;
