use std::io::{self, Write};

use rand::Rng;
use tracing::info;

use crate::capture::Capture;
use crate::config::Settings;
use crate::dictionary::Dictionary;
use crate::error::{Result, TyperError};
use crate::passage::Passage;
use crate::report::{self, TerminalFeedback};
use crate::runtime::{Clock, InputSource, Runner};
use crate::scorer;
use crate::speed;

/// Result of a finished test.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub passage: Passage,
    pub capture: Capture,
    pub errors: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(SessionResult),
    /// No dictionary word passed the rank and length limits.
    EmptyPassage,
}

/// One typing test: pick words, show them, time the typed line, score it.
pub fn run<R, S, C, W>(
    settings: &Settings,
    dictionary: &Dictionary,
    rng: &mut R,
    runner: &mut Runner<S, C>,
    out: &mut W,
) -> Result<SessionOutcome>
where
    R: Rng + ?Sized,
    S: InputSource,
    C: Clock,
    W: Write,
{
    let passage = settings.selector().select(dictionary, rng);
    if passage.is_empty() {
        info!(top_n = settings.top_n, "empty passage");
        report::empty_passage(out, settings.top_n)?;
        return Ok(SessionOutcome::EmptyPassage);
    }

    report::passage(out, &passage)?;

    let capture = runner.capture().map_err(|err| match err.kind() {
        io::ErrorKind::Interrupted => TyperError::Aborted,
        _ => TyperError::Io(err),
    })?;

    let target = passage.target();
    let mut feedback = TerminalFeedback::new(out);
    let errors = scorer::score(&target, &capture.input, &mut feedback);
    feedback.finish()?;

    let rate = speed::rate(
        settings.measure_units,
        capture.input.char_count(),
        errors,
        capture.elapsed,
    );
    report::summary(out, errors, capture.elapsed, rate, settings.measure_units)?;

    info!(
        words = passage.word_count(),
        errors,
        elapsed_ms = u64::try_from(capture.elapsed_ms()).unwrap_or(u64::MAX),
        rate,
        unit = %settings.measure_units,
        "test finished"
    );

    Ok(SessionOutcome::Completed(SessionResult {
        passage,
        capture,
        errors,
        rate,
    }))
}
