use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use tracing::debug;

use crate::error::DictionaryError;

static RES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/res");

/// Name of the word list compiled into the binary.
pub const BUNDLED_NAME: &str = "english.txt";

/// Upper bound on the capacity reserved from a `--dictionary-size` hint.
const MAX_PREALLOC: usize = 1 << 20;

/// Words ordered by frequency, most frequent first. A word's rank is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// Reads newline separated tokens. Surrounding whitespace is trimmed and
    /// blank lines do not take a rank.
    pub fn from_reader<R: BufRead>(reader: R, size_hint: usize) -> io::Result<Self> {
        let mut words = Vec::with_capacity(size_hint.min(MAX_PREALLOC));
        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if !word.is_empty() {
                words.push(word.to_string());
            }
        }
        Ok(Self { words })
    }

    pub fn load<P: AsRef<Path>>(path: P, size_hint: usize) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => DictionaryError::Missing {
                path: path.to_path_buf(),
            },
            _ => DictionaryError::Unreadable {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let dictionary = Self::from_reader(BufReader::new(file), size_hint).map_err(|source| {
            DictionaryError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!(path = %path.display(), words = dictionary.len(), "dictionary loaded");
        Ok(dictionary)
    }

    /// The English list shipped inside the binary.
    pub fn bundled() -> Result<Self, DictionaryError> {
        let unavailable = |source: io::Error| DictionaryError::Unreadable {
            path: PathBuf::from(BUNDLED_NAME),
            source,
        };

        let file = RES_DIR.get_file(BUNDLED_NAME).ok_or_else(|| {
            unavailable(io::Error::new(
                io::ErrorKind::NotFound,
                "word list missing from the build",
            ))
        })?;

        Self::from_reader(file.contents(), 20_000).map_err(unavailable)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn get(&self, rank: usize) -> Option<&str> {
        self.words.get(rank).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Where the word list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    Bundled,
    File(PathBuf),
}

impl DictionarySource {
    pub fn load(&self, size_hint: usize) -> Result<Dictionary, DictionaryError> {
        match self {
            DictionarySource::Bundled => Dictionary::bundled(),
            DictionarySource::File(path) => Dictionary::load(path, size_hint),
        }
    }
}

impl From<Option<PathBuf>> for DictionarySource {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(DictionarySource::Bundled, DictionarySource::File)
    }
}
