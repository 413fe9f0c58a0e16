//! The sequence-generator seam. The neural decoder is an external
//! collaborator; the simulator only depends on the [`SequenceGenerator`]
//! trait. [`ScriptedGenerator`] is the in-repo implementation backed by a
//! pre-translated corpus, used by the binary and as a deterministic test
//! collaborator.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::constraints::GenerationConstraints;
use crate::vocabulary::{TokenId, Vocabulary};

/// Beam-search knobs carried opaquely from configuration to the decoder; the
/// simulator itself never interprets them.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DecodingParams {
    pub beam_size: usize,
    pub normalize_score: bool,
    pub alpha_factor: f32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        DecodingParams {
            beam_size: 12,
            normalize_score: true,
            alpha_factor: 0.6,
        }
    }
}

/// One decoder call's result: a token-id sequence, its score, and optional
/// per-output-step attention over source positions (only needed when
/// alignment-based unknown replacement is enabled).
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub token_ids: Vec<TokenId>,
    pub score: f32,
    pub attention: Option<Vec<Vec<f32>>>,
}

pub trait SequenceGenerator {
    /// Produce a full hypothesis for `source` honouring `constraints`:
    /// every fixed word must appear at its position and isle blocks must be
    /// kept intact. A failure here aborts the whole run; the simulator never
    /// retries a generator call.
    fn generate(
        &mut self,
        source: &[String],
        constraints: &GenerationConstraints,
    ) -> SimResult<GenerationOutcome>;
}

/// Generator backed by a pre-translated corpus: each source sentence maps to
/// one base translation. Constraint handling overlays the user's fixed words
/// on top of the base output, extending it for insertions at the end, which
/// is the minimal behaviour the trait contract demands.
#[derive(Debug)]
pub struct ScriptedGenerator {
    translations: HashMap<String, Vec<TokenId>>,
    params: DecodingParams,
}

impl ScriptedGenerator {
    /// Builds the generator from aligned source/translation sentence pairs,
    /// interning every translation word in `vocabulary` (the decoder knows
    /// its own output vocabulary; reference-only words stay out of it).
    pub fn from_parallel(
        sources: &[Vec<String>],
        translations: &[Vec<String>],
        vocabulary: &mut Vocabulary,
    ) -> SimResult<Self> {
        if sources.len() != translations.len() {
            return Err(SimError::Generator(format!(
                "scripted corpus is not parallel: {} sources vs {} translations",
                sources.len(),
                translations.len()
            )));
        }
        let mut table = HashMap::with_capacity(sources.len());
        for (source, translation) in sources.iter().zip(translations) {
            let ids = translation.iter().map(|w| vocabulary.insert(w)).collect();
            table.insert(source.join(" "), ids);
        }
        Ok(ScriptedGenerator {
            translations: table,
            params: DecodingParams::default(),
        })
    }

    pub fn with_params(mut self, params: DecodingParams) -> Self {
        self.params = params;
        self
    }
}

impl SequenceGenerator for ScriptedGenerator {
    fn generate(
        &mut self,
        source: &[String],
        constraints: &GenerationConstraints,
    ) -> SimResult<GenerationOutcome> {
        let key = source.join(" ");
        let base = self.translations.get(&key).ok_or_else(|| {
            SimError::Generator(format!("no scripted translation for source `{key}`"))
        })?;

        let mut token_ids = base.clone();
        for (&position, &token) in &constraints.fixed_words {
            if position < token_ids.len() {
                token_ids[position] = token;
            } else {
                // Insertion at the end of the hypothesis.
                token_ids.push(token);
            }
        }
        tracing::trace!(
            beam_size = self.params.beam_size,
            fixed = constraints.fixed_words.len(),
            isles = constraints.isles.len(),
            "scripted generation"
        );
        Ok(GenerationOutcome {
            token_ids,
            score: 0.0,
            attention: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::constraints::FixedWordsMap;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn scripted(source: &str, translation: &str) -> (ScriptedGenerator, Vocabulary) {
        let mut vocab = Vocabulary::new();
        let gen = ScriptedGenerator::from_parallel(
            &[words(source)],
            &[words(translation)],
            &mut vocab,
        )
        .expect("parallel corpus");
        (gen, vocab)
    }

    #[test]
    fn unconstrained_call_returns_base_translation() {
        let (mut gen, vocab) = scripted("la casa", "the house");
        let outcome = gen
            .generate(&words("la casa"), &GenerationConstraints::unconstrained(5))
            .unwrap();
        assert_eq!(vocab.decode(&outcome.token_ids), words("the house"));
        assert!(outcome.attention.is_none());
    }

    #[test]
    fn fixed_words_override_positions() {
        let (mut gen, mut vocab) = scripted("la casa verde", "the house green");
        let green = vocab.insert("green");
        let mut fixed = FixedWordsMap::new();
        fixed.insert(1, green);
        let constraints = GenerationConstraints {
            fixed_words: fixed,
            ..GenerationConstraints::default()
        };
        let outcome = gen.generate(&words("la casa verde"), &constraints).unwrap();
        assert_eq!(vocab.decode(&outcome.token_ids), words("the green green"));
    }

    #[test]
    fn fixed_word_past_end_extends_hypothesis() {
        let (mut gen, mut vocab) = scripted("hola", "hello");
        let there = vocab.insert("there");
        let mut fixed = FixedWordsMap::new();
        fixed.insert(1, there);
        let constraints = GenerationConstraints {
            fixed_words: fixed,
            ..GenerationConstraints::default()
        };
        let outcome = gen.generate(&words("hola"), &constraints).unwrap();
        assert_eq!(vocab.decode(&outcome.token_ids), words("hello there"));
    }

    #[test]
    fn unknown_source_is_a_generator_failure() {
        let (mut gen, _vocab) = scripted("la casa", "the house");
        let err = gen
            .generate(&words("el perro"), &GenerationConstraints::unconstrained(5))
            .unwrap_err();
        assert!(matches!(err, SimError::Generator(_)));
    }

    #[test]
    fn misaligned_parallel_corpus_is_rejected() {
        let mut vocab = Vocabulary::new();
        let err = ScriptedGenerator::from_parallel(
            &[words("uno"), words("dos")],
            &[words("one")],
            &mut vocab,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::Generator(_)));
    }
}
