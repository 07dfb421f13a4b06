//! Sentence tokenization and dictionary lookup.

use unicode_segmentation::UnicodeSegmentation;

use crate::dictionary::{Dictionary, Disjunct, LEFT_WALL, RIGHT_WALL, UNKNOWN_WORD};
use crate::error::{LinkGrammarError, Result};

/// A token of the input sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Byte offset in the sentence
    pub start: usize,
}

/// Split a sentence on unicode word boundaries, dropping whitespace.
///
/// Punctuation becomes a token of its own: `иду.` yields `иду` and `.`.
/// Adjacent repeats of one punctuation mark stay together, so `...` is a
/// single token.
pub fn tokenize(sentence: &str) -> Vec<Token<'_>> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    for (start, text) in sentence.split_word_bound_indices() {
        if text.chars().all(char::is_whitespace) {
            continue;
        }
        if let Some(last) = tokens.last_mut() {
            if last.start + last.text.len() == start && repeats_mark(last.text, text) {
                last.text = &sentence[last.start..start + text.len()];
                continue;
            }
        }
        tokens.push(Token { text, start });
    }
    tokens
}

/// `next` is one punctuation mark and `prev` is a run of that same mark.
fn repeats_mark(prev: &str, next: &str) -> bool {
    let mut chars = next.chars();
    match (chars.next(), chars.next()) {
        (Some(mark), None) if !mark.is_alphanumeric() && !mark.is_whitespace() => {
            prev.chars().all(|c| c == mark)
        }
        _ => false,
    }
}

/// How a word was found in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSource {
    Wall,
    Lexicon,
    /// Found after lower-casing the sentence-initial word
    Lowercased,
    /// Matched a regex word class
    RegexClass,
    Unknown,
}

/// One dictionary reading of a word: a display form plus a disjunct.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub display: String,
    pub disjunct: Disjunct,
}

/// A word position of the sentence together with all its readings.
#[derive(Debug, Clone)]
pub struct SentenceWord {
    pub token: String,
    pub source: WordSource,
    pub candidates: Vec<Candidate>,
}

impl SentenceWord {
    pub fn is_wall(&self) -> bool {
        self.source == WordSource::Wall
    }
}

/// Build the word array the search runs over: LEFT-WALL, the tokens, and
/// RIGHT-WALL when the dictionary defines one.
pub fn build_words(dict: &Dictionary, tokens: &[Token<'_>]) -> Result<Vec<SentenceWord>> {
    let mut words = Vec::with_capacity(tokens.len() + 2);
    words.push(wall(dict, LEFT_WALL)?);

    for (i, token) in tokens.iter().enumerate() {
        words.push(lookup(dict, token.text, i == 0)?);
    }

    if dict.has_right_wall() {
        words.push(wall(dict, RIGHT_WALL)?);
    }
    Ok(words)
}

fn wall(dict: &Dictionary, name: &str) -> Result<SentenceWord> {
    let entries = dict.lookup(name).ok_or_else(|| {
        LinkGrammarError::parse(format!("dictionary '{}' has no {}", dict.language(), name))
    })?;
    Ok(SentenceWord {
        token: name.to_string(),
        source: WordSource::Wall,
        candidates: candidates(entries.iter().map(|e| (e.display.clone(), &e.disjuncts))),
    })
}

fn lookup(dict: &Dictionary, token: &str, sentence_initial: bool) -> Result<SentenceWord> {
    let found = |source: WordSource, display: Option<String>, key: &str| {
        dict.lookup(key).map(|entries| SentenceWord {
            token: token.to_string(),
            source,
            candidates: candidates(entries.iter().map(|e| {
                (display.clone().unwrap_or_else(|| e.display.clone()), &e.disjuncts)
            })),
        })
    };

    if let Some(word) = found(WordSource::Lexicon, None, token) {
        return Ok(word);
    }
    if sentence_initial {
        let lower = token.to_lowercase();
        if lower != token {
            if let Some(word) = found(WordSource::Lowercased, None, &lower) {
                return Ok(word);
            }
        }
    }
    if let Some(class) = dict.regex_classes().classify(token) {
        if let Some(word) = found(WordSource::RegexClass, Some(format!("{}[!]", token)), class) {
            return Ok(word);
        }
    }
    if let Some(word) = found(WordSource::Unknown, Some(format!("{}[?]", token)), UNKNOWN_WORD) {
        return Ok(word);
    }

    Err(LinkGrammarError::parse(format!(
        "word '{}' is not in the '{}' dictionary",
        token,
        dict.language()
    )))
}

fn candidates<'a>(entries: impl Iterator<Item = (String, &'a Vec<Disjunct>)>) -> Vec<Candidate> {
    entries
        .flat_map(|(display, disjuncts)| {
            disjuncts.iter().map(move |d| Candidate {
                display: display.clone(),
                disjunct: d.clone(),
            })
        })
        .collect()
}
