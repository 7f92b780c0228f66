use std::fmt;

use itertools::Itertools;

/// Words chosen for one test, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passage {
    words: Vec<String>,
}

impl Passage {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The string the user is asked to type: words joined by single spaces.
    pub fn target(&self) -> String {
        self.words.iter().join(" ")
    }
}

impl fmt::Display for Passage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words.iter().format(" "))
    }
}

impl From<Vec<String>> for Passage {
    fn from(words: Vec<String>) -> Self {
        Self::new(words)
    }
}
