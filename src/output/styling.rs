use std::fmt::Display;

use comfy_table::Color as TableColor;
use console::{style, StyledObject};

/// How a value should read on the terminal.
///
/// Coverage percentages map onto the first four tones by threshold so the
/// overview text and the table cells agree on what counts as healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Fair,
    Weak,
    Poor,
    Muted,
}

impl Tone {
    /// Green from 90%, yellow from 75%, orange from 50%, red below. Unset
    /// coverage is muted.
    pub fn for_coverage(pct: Option<f64>) -> Self {
        match pct {
            None => Tone::Muted,
            Some(pct) if pct >= 90.0 => Tone::Good,
            Some(pct) if pct >= 75.0 => Tone::Fair,
            Some(pct) if pct >= 50.0 => Tone::Weak,
            Some(_) => Tone::Poor,
        }
    }

    /// Failure counts read red when non-zero.
    pub fn for_failures(count: usize) -> Self {
        if count > 0 {
            Tone::Poor
        } else {
            Tone::Fair
        }
    }

    pub fn table_color(self) -> TableColor {
        match self {
            Tone::Good => TableColor::Green,
            Tone::Fair => TableColor::Yellow,
            Tone::Weak => TableColor::DarkYellow,
            Tone::Poor => TableColor::Red,
            Tone::Muted => TableColor::DarkGrey,
        }
    }
}

pub fn toned(text: impl Display, tone: Tone) -> StyledObject<String> {
    let styled = style(text.to_string());
    match tone {
        Tone::Good => styled.bright().green(),
        Tone::Fair => styled.bright().yellow(),
        Tone::Weak => styled.color256(208),
        Tone::Poor => styled.bright().red(),
        Tone::Muted => styled.dim(),
    }
}

/// Section titles and their emoji
pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

/// Field names in the overview block
pub fn label(text: impl Display) -> StyledObject<String> {
    toned(text, Tone::Muted)
}

/// Counts shown next to a label
pub fn figure(text: impl Display) -> StyledObject<String> {
    toned(text, Tone::Fair)
}

pub fn bullet() -> StyledObject<String> {
    style("•".to_string()).cyan()
}

pub fn brand(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
