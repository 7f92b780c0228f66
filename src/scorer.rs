use crate::capture::TypedInput;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// A typed character and whether it matched the target at its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keystroke {
    pub char: char,
    pub outcome: Outcome,
}

/// Receives keystrokes in the order they are compared.
pub trait KeystrokeSink {
    fn record(&mut self, keystroke: Keystroke);
}

impl KeystrokeSink for Vec<Keystroke> {
    fn record(&mut self, keystroke: Keystroke) {
        self.push(keystroke);
    }
}

/// Discards feedback.
pub struct NoFeedback;

impl KeystrokeSink for NoFeedback {
    fn record(&mut self, _keystroke: Keystroke) {}
}

/// Counts errors in `typed` against `target`.
///
/// The count is the sum of three terms:
/// - 1 if the first typed character differs from the first target character
///   (or only one of them exists);
/// - the difference between the target length and the typed length;
/// - one per mismatch when the rest of the target and the rest of the input
///   are compared position by position, up to the shorter of the two.
///
/// A length mismatch is therefore penalized by the second term and can be
/// penalized again by the third. Lengths are in characters.
pub fn score<S: KeystrokeSink + ?Sized>(target: &str, typed: &TypedInput, sink: &mut S) -> usize {
    let mut target_chars = target.chars();
    let target_first = target_chars.next();
    let mut errors = 0;

    match typed.first {
        Some(c) => errors += compare(target_first, c, sink),
        None if target_first.is_some() => errors += 1,
        None => {}
    }

    errors += target.chars().count().abs_diff(typed.char_count());

    errors += target_chars
        .zip(typed.rest.chars())
        .map(|(expected, c)| compare(Some(expected), c, &mut *sink))
        .sum::<usize>();

    errors
}

/// Scores without producing feedback.
pub fn count_errors(target: &str, typed: &TypedInput) -> usize {
    score(target, typed, &mut NoFeedback)
}

fn compare<S: KeystrokeSink + ?Sized>(expected: Option<char>, typed: char, sink: &mut S) -> usize {
    let outcome = if expected == Some(typed) {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    };
    sink.record(Keystroke {
        char: typed,
        outcome,
    });
    usize::from(outcome == Outcome::Incorrect)
}
