use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Characters per word when converting character rates to word rates.
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MeasureUnit {
    /// words per minute
    #[default]
    Wpm,
    /// characters per minute
    Cpm,
    /// words per second
    Wps,
    /// characters per second
    Cps,
}

/// Typing speed over correctly typed characters: everything typed minus the
/// error count, floored at zero.
pub fn rate(unit: MeasureUnit, typed_chars: usize, errors: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }

    let cps = typed_chars.saturating_sub(errors) as f64 / secs;
    match unit {
        MeasureUnit::Cps => cps,
        MeasureUnit::Cpm => cps * 60.0,
        MeasureUnit::Wps => cps / CHARS_PER_WORD,
        MeasureUnit::Wpm => cps * 60.0 / CHARS_PER_WORD,
    }
}
