use rand::seq::index;
use rand::Rng;
use tracing::debug;

use crate::dictionary::Dictionary;
use crate::passage::Passage;

/// Inclusive bounds on a word's length in characters. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthFilter {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl LengthFilter {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Builds a filter from command line values, where 0 turns a bound off.
    pub fn from_flags(min_length: usize, max_length: usize) -> Self {
        let bound = |n: usize| (n > 0).then_some(n);
        Self::new(bound(min_length), bound(max_length))
    }

    pub fn accepts(&self, word: &str) -> bool {
        let len = word.chars().count();
        self.max.map_or(true, |max| len <= max) && self.min.map_or(true, |min| len >= min)
    }
}

/// Picks passage words from the most frequent part of a dictionary.
#[derive(Debug, Clone)]
pub struct WordSelector {
    pub filter: LengthFilter,
    /// Rank cutoff: only the first `top_n` dictionary entries are candidates.
    pub top_n: usize,
    /// How many words to draw.
    pub amount: usize,
}

impl WordSelector {
    pub fn new(filter: LengthFilter, top_n: usize, amount: usize) -> Self {
        Self {
            filter,
            top_n,
            amount,
        }
    }

    /// Ranks that survive the rank limit and the length filter, in rank order.
    pub fn pool(&self, dictionary: &Dictionary) -> Vec<usize> {
        dictionary
            .words()
            .iter()
            .take(self.top_n)
            .enumerate()
            .filter(|(_, word)| self.filter.accepts(word))
            .map(|(rank, _)| rank)
            .collect()
    }

    /// Draws up to `amount` distinct ranks from the pool, uniformly and
    /// without replacement. The returned order is the draw order.
    pub fn select_ranks<R: Rng + ?Sized>(&self, dictionary: &Dictionary, rng: &mut R) -> Vec<usize> {
        let pool = self.pool(dictionary);
        let amount = self.amount.min(pool.len());

        debug!(
            dictionary = dictionary.len(),
            top_n = self.top_n,
            pool = pool.len(),
            amount,
            "sampling words"
        );

        index::sample(rng, pool.len(), amount)
            .into_iter()
            .map(|i| pool[i])
            .collect()
    }

    pub fn select<R: Rng + ?Sized>(&self, dictionary: &Dictionary, rng: &mut R) -> Passage {
        self.select_ranks(dictionary, rng)
            .into_iter()
            .filter_map(|rank| dictionary.get(rank))
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into()
    }
}
