//! Effort accounting for post-editing sessions.
//!
//! Each sentence session produces a [`SentenceEffort`]; the corpus runner owns
//! a single [`CorpusEffort`] and absorbs sentence results explicitly. Ratios
//! are computed on demand and are `None` when the denominator is zero
//! (degenerate zero-length sentences), never a division by zero.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentenceEffort {
    /// Word corrections the simulated user performed (strokes).
    pub errors: u64,
    /// Pointer actions: one per correction, one per newly selected isle,
    /// plus the final accept action at session close.
    pub mouse_actions: u64,
    /// Length in words of the final hypothesis.
    pub word_count: u64,
    /// Total characters of the final hypothesis.
    pub char_count: u64,
}

impl SentenceEffort {
    pub fn wsr(&self) -> Option<f64> {
        ratio(self.errors, self.word_count)
    }

    pub fn mar(&self) -> Option<f64> {
        ratio(self.mouse_actions, self.word_count)
    }

    pub fn mar_c(&self) -> Option<f64> {
        ratio(self.mouse_actions, self.char_count)
    }
}

/// Running corpus-level totals. Counters are non-decreasing and always equal
/// the sum of the absorbed per-sentence counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CorpusEffort {
    pub sentences: u64,
    pub errors: u64,
    pub mouse_actions: u64,
    pub word_count: u64,
    pub char_count: u64,
}

impl CorpusEffort {
    pub fn absorb(&mut self, sentence: &SentenceEffort) {
        self.sentences += 1;
        self.errors += sentence.errors;
        self.mouse_actions += sentence.mouse_actions;
        self.word_count += sentence.word_count;
        self.char_count += sentence.char_count;
    }

    /// Folds another accumulator in, e.g. partial sums from independent
    /// sentence batches. Addition, so merge order does not matter.
    pub fn merge(&mut self, other: &CorpusEffort) {
        self.sentences += other.sentences;
        self.errors += other.errors;
        self.mouse_actions += other.mouse_actions;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }

    pub fn wsr(&self) -> Option<f64> {
        ratio(self.errors, self.word_count)
    }

    pub fn mar(&self) -> Option<f64> {
        ratio(self.mouse_actions, self.word_count)
    }

    pub fn mar_c(&self) -> Option<f64> {
        ratio(self.mouse_actions, self.char_count)
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Renders an optional ratio for logs; undefined ratios print as `n/a`.
pub fn display_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(errors: u64, mouse: u64, words: u64, chars: u64) -> SentenceEffort {
        SentenceEffort {
            errors,
            mouse_actions: mouse,
            word_count: words,
            char_count: chars,
        }
    }

    #[test]
    fn corpus_totals_equal_sum_of_sentences() {
        let parts = [sentence(1, 2, 3, 12), sentence(0, 1, 5, 20), sentence(4, 6, 4, 9)];
        let mut corpus = CorpusEffort::default();
        for p in &parts {
            corpus.absorb(p);
        }
        assert_eq!(corpus.sentences, 3);
        assert_eq!(corpus.errors, 5);
        assert_eq!(corpus.mouse_actions, 9);
        assert_eq!(corpus.word_count, 12);
        assert_eq!(corpus.char_count, 41);
        assert_eq!(corpus.wsr(), Some(5.0 / 12.0));
    }

    #[test]
    fn merge_is_order_independent() {
        let parts = [sentence(2, 3, 7, 30), sentence(1, 1, 2, 6), sentence(0, 2, 4, 15)];

        let mut forward = CorpusEffort::default();
        for p in &parts {
            forward.absorb(p);
        }

        let mut reversed = CorpusEffort::default();
        for p in parts.iter().rev() {
            let mut partial = CorpusEffort::default();
            partial.absorb(p);
            reversed.merge(&partial);
        }

        assert_eq!(forward, reversed);
    }

    #[test]
    fn degenerate_sentence_has_undefined_ratios() {
        let empty = sentence(0, 1, 0, 0);
        assert_eq!(empty.wsr(), None);
        assert_eq!(empty.mar(), None);
        assert_eq!(empty.mar_c(), None);
        assert_eq!(display_ratio(empty.wsr()), "n/a");
    }

    #[test]
    fn sentence_ratios() {
        let s = sentence(1, 2, 3, 10);
        assert_eq!(s.wsr(), Some(1.0 / 3.0));
        assert_eq!(s.mar(), Some(2.0 / 3.0));
        assert_eq!(s.mar_c(), Some(0.2));
        assert_eq!(display_ratio(s.mar_c()), "0.2000");
    }
}
