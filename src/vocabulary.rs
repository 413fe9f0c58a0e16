use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub type TokenId = u32;

/// Reserved id for out-of-vocabulary surface forms. The vocabulary always
/// holds [`UNK_TOKEN`] at this slot.
pub const UNK_ID: TokenId = 0;
pub const UNK_TOKEN: &str = "<unk>";

/// How raw corpus lines are split into surface tokens. Resolved once at
/// startup into a concrete [`Tokenizer`]; no name-based dispatch afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizeMode {
    /// Plain whitespace splitting; the corpus is assumed pre-tokenized.
    #[default]
    None,
    /// Whitespace splitting after detaching punctuation from word boundaries.
    Basic,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    mode: TokenizeMode,
    punct: Option<Regex>,
}

impl Tokenizer {
    pub fn new(mode: TokenizeMode) -> Self {
        let punct = match mode {
            TokenizeMode::None => None,
            // The pattern is static, so compilation cannot fail.
            TokenizeMode::Basic => Some(
                Regex::new(r#"([.,!?;:"()\[\]])"#).expect("static punctuation pattern"),
            ),
        };
        Tokenizer { mode, punct }
    }

    pub fn mode(&self) -> TokenizeMode {
        self.mode
    }

    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let prepared = match &self.punct {
            Some(re) => re.replace_all(line, " $1 ").into_owned(),
            None => line.to_string(),
        };
        prepared.split_whitespace().map(str::to_string).collect()
    }
}

/// Bidirectional word <-> token-id mapping with a reserved `<unk>` slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    str_to_id: HashMap<String, TokenId>,
    id_to_str: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        let mut vocab = Vocabulary {
            str_to_id: HashMap::new(),
            id_to_str: Vec::new(),
        };
        vocab.insert(UNK_TOKEN);
        debug_assert_eq!(vocab.str_to_id[UNK_TOKEN], UNK_ID);
        vocab
    }

    /// Gets the id for a word, assigning a fresh one if it is new.
    pub fn insert(&mut self, word: &str) -> TokenId {
        if let Some(&id) = self.str_to_id.get(word) {
            id
        } else {
            let id = self.id_to_str.len() as TokenId;
            self.str_to_id.insert(word.to_string(), id);
            self.id_to_str.push(word.to_string());
            id
        }
    }

    /// Id for a word, or [`UNK_ID`] when the word is out of vocabulary.
    pub fn token_id(&self, word: &str) -> TokenId {
        self.str_to_id.get(word).copied().unwrap_or(UNK_ID)
    }

    /// Id for a word only if it is actually in the vocabulary.
    pub fn lookup(&self, word: &str) -> Option<TokenId> {
        self.str_to_id.get(word).copied()
    }

    /// Surface form for an id; ids outside the table decode to `<unk>`.
    pub fn surface(&self, id: TokenId) -> &str {
        self.id_to_str
            .get(id as usize)
            .map_or(UNK_TOKEN, String::as_str)
    }

    pub fn encode(&self, words: &[String]) -> Vec<TokenId> {
        words.iter().map(|w| self.token_id(w)).collect()
    }

    pub fn decode(&self, ids: &[TokenId]) -> Vec<String> {
        ids.iter().map(|&id| self.surface(id).to_string()).collect()
    }

    /// Populates the vocabulary from already-tokenized sentences.
    pub fn extend_from_sentences<'a, I>(&mut self, sentences: I)
    where
        I: IntoIterator<Item = &'a Vec<String>>,
    {
        for sentence in sentences {
            for word in sentence {
                self.insert(word);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn unk_occupies_slot_zero() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.token_id(UNK_TOKEN), UNK_ID);
        assert_eq!(vocab.surface(UNK_ID), UNK_TOKEN);
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn unknown_words_map_to_unk_id() {
        let mut vocab = Vocabulary::new();
        vocab.insert("casa");
        assert_eq!(vocab.token_id("jardín"), UNK_ID);
        assert_eq!(vocab.lookup("jardín"), None);
        assert!(vocab.lookup("casa").is_some());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut vocab = Vocabulary::new();
        let first = vocab.insert("house");
        let second = vocab.insert("house");
        assert_eq!(first, second);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn roundtrip_through_ids() {
        let mut vocab = Vocabulary::new();
        let sentence = words("the cat sits");
        vocab.extend_from_sentences([&sentence]);
        let ids = vocab.encode(&sentence);
        assert_eq!(vocab.decode(&ids), sentence);
    }

    #[test]
    fn out_of_range_id_decodes_to_unk() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.surface(999), UNK_TOKEN);
    }

    #[test]
    fn basic_tokenizer_detaches_punctuation() {
        let tok = Tokenizer::new(TokenizeMode::Basic);
        assert_eq!(tok.tokenize("hello, world!"), words("hello , world !"));
    }

    #[test]
    fn none_tokenizer_splits_on_whitespace_only() {
        let tok = Tokenizer::new(TokenizeMode::None);
        assert_eq!(tok.tokenize("hello, world!"), words("hello, world!"));
        assert!(tok.tokenize("   ").is_empty());
    }
}
