//! Terminal colour helpers

use owo_colors::{colors::css, OwoColorize};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Failure,
    Muted,
}

/// Paints `text` in the given tone, or returns it unchanged when colour is off.
pub fn paint(text: &str, tone: Tone) -> String {
    if !supports_color() {
        return text.to_string();
    }
    match tone {
        Tone::Success => text.fg::<css::Green>().to_string(),
        Tone::Warning => text.fg::<css::Orange>().to_string(),
        Tone::Failure => text.fg::<css::Red>().to_string(),
        Tone::Muted => text.dimmed().to_string(),
    }
}

/// Extension trait for colorizing output
pub trait Colorize {
    fn tone(&self, tone: Tone) -> String;

    fn success(&self) -> String {
        self.tone(Tone::Success)
    }

    fn warning(&self) -> String {
        self.tone(Tone::Warning)
    }

    fn failure(&self) -> String {
        self.tone(Tone::Failure)
    }

    fn dim(&self) -> String {
        self.tone(Tone::Muted)
    }
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn tone(&self, tone: Tone) -> String {
        paint(self.as_ref(), tone)
    }
}
