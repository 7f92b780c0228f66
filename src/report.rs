use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::queue;
use crossterm::style::{Print, PrintStyledContent, Stylize};

use crate::passage::Passage;
use crate::scorer::{Keystroke, KeystrokeSink, Outcome};
use crate::speed::MeasureUnit;

/// Prints keystrokes as they are scored: correct ones plain, wrong ones red.
pub struct TerminalFeedback<'w, W: Write> {
    out: &'w mut W,
    error: Option<io::Error>,
}

impl<'w, W: Write> TerminalFeedback<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        Self { out, error: None }
    }

    /// Ends the feedback line and surfaces the first write failure, if any.
    pub fn finish(self) -> io::Result<()> {
        if let Some(err) = self.error {
            return Err(err);
        }
        queue!(self.out, Print('\n'))?;
        self.out.flush()
    }
}

impl<W: Write> KeystrokeSink for TerminalFeedback<'_, W> {
    fn record(&mut self, keystroke: Keystroke) {
        if self.error.is_some() {
            return;
        }
        let written = match keystroke.outcome {
            Outcome::Correct => queue!(self.out, Print(keystroke.char)),
            Outcome::Incorrect => queue!(self.out, PrintStyledContent(keystroke.char.red())),
        };
        if let Err(err) = written {
            self.error = Some(err);
        }
    }
}

pub fn passage<W: Write>(out: &mut W, passage: &Passage) -> io::Result<()> {
    writeln!(out, "{passage}")?;
    out.flush()
}

pub fn empty_passage<W: Write>(out: &mut W, top_n: usize) -> io::Result<()> {
    queue!(
        out,
        PrintStyledContent(
            format!("no word among the top {top_n} matches the length limits, empty test generated")
                .yellow()
        ),
        Print('\n')
    )?;
    out.flush()
}

pub fn summary<W: Write>(
    out: &mut W,
    errors: usize,
    elapsed: Duration,
    rate: f64,
    unit: MeasureUnit,
) -> io::Result<()> {
    writeln!(out, "Errors: {errors}")?;
    queue!(
        out,
        PrintStyledContent(format!("You were typing: {}ms", elapsed.as_millis()).yellow()),
        Print('\n')
    )?;
    writeln!(out, "Speed: {rate:.2} {unit}")?;
    out.flush()
}

/// One red line on the error stream.
pub fn error<W: Write>(out: &mut W, err: &impl Display) -> io::Result<()> {
    queue!(out, PrintStyledContent(err.to_string().red()), Print('\n'))?;
    out.flush()
}
