//! Back-substitution of user-supplied out-of-vocabulary words.
//!
//! The generator can only emit the reserved `<unk>` id for words outside its
//! vocabulary, so every OOV correction the user makes is recorded as an
//! [`UnkWord`] and written back into the regenerated hypothesis here. A
//! correction is never dropped, even when the generator's output turns out
//! shorter than expected.

/// An out-of-vocabulary correction: the hypothesis position the user fixed
/// and the surface form they typed. Deduplicated by position within one
/// sentence session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnkWord {
    pub position: usize,
    pub surface: String,
}

/// Writes pending unknown words into the regenerated hypothesis.
///
/// When the hypothesis has fewer positions than there are pending words, the
/// available positions are filled left to right and the remainder appended.
/// Otherwise each word lands at its recorded position, or is appended when
/// that position no longer exists.
pub fn resolve(mut hypothesis: Vec<String>, pending: &[UnkWord]) -> Vec<String> {
    if pending.is_empty() {
        return hypothesis;
    }
    if hypothesis.len() < pending.len() {
        for (slot, unk) in hypothesis.iter_mut().zip(pending) {
            *slot = unk.surface.clone();
        }
        for unk in &pending[hypothesis.len()..] {
            hypothesis.push(unk.surface.clone());
        }
    } else {
        for unk in pending {
            if unk.position < hypothesis.len() {
                hypothesis[unk.position] = unk.surface.clone();
            } else {
                hypothesis.push(unk.surface.clone());
            }
        }
    }
    hypothesis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn unk(position: usize, surface: &str) -> UnkWord {
        UnkWord {
            position,
            surface: surface.to_string(),
        }
    }

    #[test]
    fn no_pending_words_leaves_hypothesis_untouched() {
        let hyp = words("the <unk> sits");
        assert_eq!(resolve(hyp.clone(), &[]), hyp);
    }

    #[test]
    fn pending_word_replaces_its_position() {
        let hyp = words("the <unk> sits");
        let resolved = resolve(hyp, &[unk(1, "Mietzekatze")]);
        assert_eq!(resolved, words("the Mietzekatze sits"));
    }

    #[test]
    fn position_past_end_appends() {
        let hyp = words("short output");
        let resolved = resolve(hyp, &[unk(5, "tail")]);
        assert_eq!(resolved, words("short output tail"));
    }

    #[test]
    fn more_pending_than_positions_fills_then_appends() {
        let hyp = words("x");
        let resolved = resolve(hyp, &[unk(0, "alpha"), unk(3, "beta"), unk(4, "gamma")]);
        assert_eq!(resolved, words("alpha beta gamma"));
    }

    #[test]
    fn every_correction_survives_exactly_once() {
        let pending = [unk(0, "uno"), unk(2, "dos"), unk(7, "tres")];
        let resolved = resolve(words("a b c d"), &pending);
        for unk in &pending {
            assert_eq!(
                resolved.iter().filter(|w| **w == unk.surface).count(),
                1,
                "lost or duplicated `{}` in {resolved:?}",
                unk.surface
            );
        }
    }
}
