//! The interactive post-editing state machine for one sentence.
//!
//! Each session drives the loop: detect isles, locate the single leftmost
//! divergence, fix it, regenerate under the accumulated constraints, resolve
//! unknown words, and check for convergence. One user action per regeneration
//! cycle is the modelled behaviour, so the loop is bounded by the reference
//! length.

use crate::error::SimResult;
use crate::metrics::SentenceEffort;
use crate::simulation::constraints::{
    count_new_isle_selections, isle_constraints, FixedWordsMap, GenerationConstraints,
};
use crate::simulation::generator::SequenceGenerator;
use crate::simulation::isles::{find_isles, isles_cover_reference};
use crate::simulation::unknowns::{self, UnkWord};
use crate::vocabulary::{TokenId, Vocabulary};

/// Per-sentence lifecycle. `Validated` and `Truncated` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFirstHypothesis,
    Correcting,
    Validated,
    Truncated,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionParams {
    /// Prefix-only correction when true; isle detection when false.
    pub prefix_mode: bool,
    /// Passed through to the generator as its new-token budget.
    pub max_extra_tokens: usize,
}

/// Result of one closed sentence session.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub state: SessionState,
    /// Hypothesis after the interaction converged (or was truncated).
    pub final_hypothesis: Vec<String>,
    /// The uncorrected first hypothesis, before any interaction.
    pub original_hypothesis: Vec<String>,
    pub effort: SentenceEffort,
    /// Number of regeneration calls after the initial one.
    pub iterations: u32,
}

/// Runs one full correction session for a source/reference pair.
///
/// The generator is called once unconstrained for the initial hypothesis and
/// then once per correction. Any generator error aborts the session (and the
/// run); there is no meaningful partial state to resume from mid-sentence.
pub fn run_sentence(
    source: &[String],
    reference: &[String],
    generator: &mut dyn SequenceGenerator,
    vocabulary: &Vocabulary,
    params: &SessionParams,
) -> SimResult<SessionOutcome> {
    // The session starts in `AwaitingFirstHypothesis`; the first generator
    // call below transitions it to `Correcting` or straight to `Validated`.
    let mut state: SessionState;
    let mut effort = SentenceEffort::default();
    let mut iterations = 0u32;

    let first = generator.generate(
        source,
        &GenerationConstraints::unconstrained(params.max_extra_tokens),
    )?;
    let mut hypothesis = vocabulary.decode(&first.token_ids);
    let original_hypothesis = hypothesis.clone();
    tracing::debug!(hypo = %hypothesis.join(" "), "hypothesis 0");

    if hypothesis == reference {
        state = SessionState::Validated;
    } else {
        state = SessionState::Correcting;

        let mut checked_h = 0usize;
        let mut checked_r = 0usize;
        let mut last_checked = 0usize;
        let mut fixed_words = FixedWordsMap::new();
        let mut unk_words: Vec<UnkWord> = Vec::new();
        // Isle blocks selected in the previous iteration; selecting one of
        // these again costs nothing.
        let mut previous_blocks: Vec<Vec<TokenId>> = Vec::new();

        while checked_r < reference.len() && iterations <= reference.len() as u32 {
            let mut validated_prefix: Vec<TokenId> = Vec::new();

            let isles = if params.prefix_mode {
                Vec::new()
            } else {
                let found = find_isles(&hypothesis, reference);
                tracing::debug!(?found, "isles");
                if isles_cover_reference(&found, reference) {
                    tracing::debug!("isles validate the full hypothesis");
                    hypothesis = reference.to_vec();
                    state = SessionState::Validated;
                    break;
                }
                let constraints = isle_constraints(&found, vocabulary);
                effort.mouse_actions +=
                    count_new_isle_selections(&constraints, &previous_blocks, last_checked);
                constraints
            };

            // Left-to-right scan for the single leftmost divergence. Matches
            // grow the validated prefix silently; the first mismatch is
            // corrected and the scan halts for this cycle.
            while checked_r < reference.len() {
                if checked_h >= hypothesis.len() {
                    // Ran out of hypothesis words: insertion at the end.
                    effort.errors += 1;
                    effort.mouse_actions += 1;
                    let word = &reference[checked_r];
                    let id = vocabulary.token_id(word);
                    fixed_words.insert(checked_h, id);
                    validated_prefix.push(id);
                    record_if_oov(&mut unk_words, vocabulary, checked_h, word);
                    tracing::debug!(word = %word, position = checked_h, "insertion at end");
                    last_checked = checked_h;
                    break;
                } else if hypothesis[checked_h] != reference[checked_r] {
                    // Substitution of the diverging word.
                    effort.errors += 1;
                    effort.mouse_actions += 1;
                    let word = &reference[checked_r];
                    let id = vocabulary.token_id(word);
                    fixed_words.insert(checked_h, id);
                    validated_prefix.push(id);
                    record_if_oov(&mut unk_words, vocabulary, checked_h, word);
                    tracing::debug!(word = %word, position = checked_h, "substitution");
                    last_checked = checked_h;
                    break;
                } else {
                    // Already correct; the validated prefix grows for free.
                    let id = vocabulary.token_id(&hypothesis[checked_h]);
                    fixed_words.insert(checked_h, id);
                    validated_prefix.push(id);
                    checked_h += 1;
                    checked_r += 1;
                    last_checked = checked_h;
                }
            }

            if checked_r >= reference.len() {
                break;
            }

            previous_blocks = isles.iter().map(|isle| isle.token_ids.clone()).collect();
            previous_blocks.push(validated_prefix);

            let constraints = GenerationConstraints {
                fixed_words: fixed_words.clone(),
                isles,
                max_extra_tokens: params.max_extra_tokens,
            };
            let regenerated = generator.generate(source, &constraints)?;
            iterations += 1;
            hypothesis = vocabulary.decode(&regenerated.token_ids);
            hypothesis = unknowns::resolve(hypothesis, &unk_words);
            tracing::debug!(n = iterations, hypo = %hypothesis.join(" "), "hypothesis");

            if hypothesis == reference {
                state = SessionState::Validated;
                break;
            }
        }

        // The reference may be a prefix of the converged hypothesis.
        if reference.len() < hypothesis.len() {
            tracing::debug!("cutting hypothesis to reference length");
            hypothesis.truncate(reference.len());
            effort.errors += 1;
            state = SessionState::Truncated;
        } else if state == SessionState::Correcting {
            state = SessionState::Validated;
        }
    }

    // Closing the session is itself one accept action.
    effort.mouse_actions += 1;
    effort.word_count = hypothesis.len() as u64;
    effort.char_count = hypothesis.iter().map(|w| w.chars().count() as u64).sum();

    Ok(SessionOutcome {
        state,
        final_hypothesis: hypothesis,
        original_hypothesis,
        effort,
        iterations,
    })
}

fn record_if_oov(
    unk_words: &mut Vec<UnkWord>,
    vocabulary: &Vocabulary,
    position: usize,
    word: &str,
) {
    if vocabulary.lookup(word).is_none() && !unk_words.iter().any(|u| u.position == position) {
        unk_words.push(UnkWord {
            position,
            surface: word.to_string(),
        });
    }
}
