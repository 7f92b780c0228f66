use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::speed::MeasureUnit;

/// Generate a typing test
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "typer",
    version,
    about,
    long_about = "Generate a typing test from the most frequent words of a ranked word list, time how long it takes to type it and count the errors."
)]
pub struct Cli {
    /// set the minimum length of a word, '0' to ignore [default: 2]
    #[clap(short = 'u', long = "min-length", visible_alias = "min")]
    pub min_length: Option<usize>,

    /// set the maximum length of a word, '0' to ignore [default: 0]
    #[clap(short = 'l', long = "max-length", visible_alias = "max")]
    pub max_length: Option<usize>,

    /// set words amount in test [default: 25]
    #[clap(short = 'a', long, visible_alias = "words-amount")]
    pub amount: Option<usize>,

    /// select n top words from your list (the file can hold 20k words while only the 200 most frequent appear in the test) [default: 200]
    #[clap(short = 't', long)]
    pub top: Option<usize>,

    /// path to dictionary file with newline separated words, most frequent first [default: bundled english list]
    #[clap(short = 'd', long)]
    pub dictionary: Option<PathBuf>,

    /// expected number of words in the dictionary file, used to read it faster [default: 20000]
    #[clap(short = 's', long)]
    pub dictionary_size: Option<usize>,

    /// units of measure [default: wpm]
    #[clap(short = 'm', long, value_enum)]
    pub measure_units: Option<MeasureUnit>,

    /// seed for word selection, to repeat the same test
    #[clap(long)]
    pub seed: Option<u64>,

    /// read and write defaults at this path instead of the user config directory
    #[clap(long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// store the effective options as the new defaults
    #[clap(long)]
    pub save_config: bool,
}

impl Cli {
    /// Lays the flags given on the command line over stored defaults.
    pub fn apply(&self, base: Config) -> Config {
        Config {
            min_length: self.min_length.unwrap_or(base.min_length),
            max_length: self.max_length.unwrap_or(base.max_length),
            amount: self.amount.unwrap_or(base.amount),
            top: self.top.unwrap_or(base.top),
            dictionary: self.dictionary.clone().or(base.dictionary),
            dictionary_size: self.dictionary_size.unwrap_or(base.dictionary_size),
            measure_units: self.measure_units.unwrap_or(base.measure_units),
        }
    }
}
