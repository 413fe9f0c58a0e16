//! Constraint structures handed to the generator, plus the mouse-action
//! accounting derived from changes in the isle structure between iterations.

use std::collections::BTreeMap;

use crate::simulation::isles::Isle;
use crate::vocabulary::{TokenId, Vocabulary};

/// Positions whose token has been validated by the user. Keyed by hypothesis
/// position so iteration order is positional, which is what the generator
/// needs; within one sentence session positions are only ever added.
pub type FixedWordsMap = BTreeMap<usize, TokenId>;

/// An isle expressed in generator terms: a start position and the token ids
/// the regenerated hypothesis must keep there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsleConstraint {
    pub position: usize,
    pub token_ids: Vec<TokenId>,
}

/// Everything the generator must satisfy on its next call.
#[derive(Debug, Clone, Default)]
pub struct GenerationConstraints {
    pub fixed_words: FixedWordsMap,
    pub isles: Vec<IsleConstraint>,
    /// Upper bound on newly generated tokens between constrained blocks.
    pub max_extra_tokens: usize,
}

impl GenerationConstraints {
    /// Constraints for the very first call of a session.
    pub fn unconstrained(max_extra_tokens: usize) -> Self {
        GenerationConstraints {
            max_extra_tokens,
            ..GenerationConstraints::default()
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.fixed_words.is_empty() && self.isles.is_empty()
    }
}

/// Maps surface isles onto token-id constraints. Out-of-vocabulary words
/// inside an isle become the reserved unk id, as in the source vocabulary
/// lookup of the decoder.
pub fn isle_constraints(isles: &[Isle], vocabulary: &Vocabulary) -> Vec<IsleConstraint> {
    isles
        .iter()
        .map(|isle| IsleConstraint {
            position: isle.position,
            token_ids: isle.words.iter().map(|w| vocabulary.token_id(w)).collect(),
        })
        .collect()
}

/// Mouse actions implied by the isle-structure delta.
///
/// Selecting a span costs 1 action regardless of its length, but only isles
/// whose token block is new relative to the previous iteration's snapshot are
/// charged; re-confirming an already-selected block is free, as is anything
/// before `last_checked_index` (already covered by the validated prefix).
pub fn count_new_isle_selections(
    isles: &[IsleConstraint],
    previous_blocks: &[Vec<TokenId>],
    last_checked_index: usize,
) -> u64 {
    isles
        .iter()
        .filter(|isle| isle.position >= last_checked_index)
        .filter(|isle| !previous_blocks.iter().any(|block| *block == isle.token_ids))
        .count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::UNK_ID;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn vocab(text: &str) -> Vocabulary {
        let mut v = Vocabulary::new();
        for w in text.split_whitespace() {
            v.insert(w);
        }
        v
    }

    #[test]
    fn isle_constraints_encode_words() {
        let v = vocab("the cat mat");
        let isles = vec![Isle {
            position: 2,
            words: words("cat mat"),
        }];
        let constraints = isle_constraints(&isles, &v);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].position, 2);
        assert_eq!(
            constraints[0].token_ids,
            vec![v.token_id("cat"), v.token_id("mat")]
        );
    }

    #[test]
    fn oov_isle_words_encode_as_unk() {
        let v = vocab("the");
        let isles = vec![Isle {
            position: 0,
            words: words("the zorro"),
        }];
        let constraints = isle_constraints(&isles, &v);
        assert_eq!(constraints[0].token_ids[1], UNK_ID);
    }

    #[test]
    fn new_isles_cost_one_action_each() {
        let isles = vec![
            IsleConstraint {
                position: 0,
                token_ids: vec![1, 2],
            },
            IsleConstraint {
                position: 4,
                token_ids: vec![5],
            },
        ];
        assert_eq!(count_new_isle_selections(&isles, &[], 0), 2);
    }

    #[test]
    fn reconfirmed_isles_are_free() {
        let isles = vec![IsleConstraint {
            position: 1,
            token_ids: vec![3, 4],
        }];
        let previous = vec![vec![3, 4]];
        assert_eq!(count_new_isle_selections(&isles, &previous, 0), 0);
    }

    #[test]
    fn isles_before_last_checked_index_are_free() {
        let isles = vec![
            IsleConstraint {
                position: 0,
                token_ids: vec![1],
            },
            IsleConstraint {
                position: 5,
                token_ids: vec![9],
            },
        ];
        assert_eq!(count_new_isle_selections(&isles, &[], 3), 1);
    }

    #[test]
    fn fixed_words_iterate_in_position_order() {
        let mut fixed = FixedWordsMap::new();
        fixed.insert(4, 40);
        fixed.insert(1, 10);
        fixed.insert(2, 20);
        let positions: Vec<usize> = fixed.keys().copied().collect();
        assert_eq!(positions, vec![1, 2, 4]);
    }
}
