use std::time::Duration;

/// One line of typed text, split the way it was read: the character that
/// started the timer, then the rest of the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedInput {
    pub first: Option<char>,
    pub rest: String,
}

impl TypedInput {
    pub fn new(first: char, rest: impl Into<String>) -> Self {
        Self {
            first: Some(first),
            rest: rest.into(),
        }
    }

    /// Splits a whole line at its first character.
    pub fn from_line(line: &str) -> Self {
        let mut chars = line.chars();
        Self {
            first: chars.next(),
            rest: chars.as_str().to_string(),
        }
    }

    /// Number of characters typed, first character included.
    pub fn char_count(&self) -> usize {
        match self.first {
            Some(_) => self.rest.chars().count() + 1,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// The full typed stream as one string.
    pub fn text(&self) -> String {
        self.first.into_iter().chain(self.rest.chars()).collect()
    }
}

/// What the capture window produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    pub input: TypedInput,
    /// From just after the first character to just after the line terminator.
    pub elapsed: Duration,
}

impl Capture {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_line_splits_off_first_char() {
        let input = TypedInput::from_line("cag dof");
        assert_eq!(input.first, Some('c'));
        assert_eq!(input.rest, "ag dof");
        assert_eq!(input.char_count(), 7);
        assert_eq!(input.text(), "cag dof");
    }

    #[test]
    fn multibyte_first_char() {
        let input = TypedInput::from_line("éa");
        assert_eq!(input.first, Some('é'));
        assert_eq!(input.rest, "a");
        assert_eq!(input.char_count(), 2);
    }

    #[test]
    fn empty_line_has_no_first_char() {
        let input = TypedInput::from_line("");
        assert!(input.is_empty());
        assert_eq!(input.char_count(), 0);
        assert_eq!(input.text(), "");
    }

    #[test]
    fn elapsed_is_truncated_to_millis() {
        let capture = Capture {
            input: TypedInput::new('a', ""),
            elapsed: Duration::from_micros(1_999),
        };
        assert_eq!(capture.elapsed_ms(), 1);
    }
}
