//! Grammar dictionaries.
//!
//! A dictionary directory `<root>/<language>/` holds `4.0.dict` (the lexicon)
//! and optionally `4.0.regex` (word classes for unknown words). Loading parses
//! the lexicon, resolves `<macro>` references and expands every word's
//! expression into disjuncts. A loaded [`Dictionary`] is immutable.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use miette::SourceSpan;
use tracing::debug;

use crate::error::{DictionarySource, LinkGrammarError, Result};

pub mod expr;
pub mod parser;
pub mod regex_classes;

pub use expr::{Connector, Direction, Disjunct, Expr};
pub use regex_classes::RegexClasses;

pub const DICT_FILE: &str = "4.0.dict";
pub const REGEX_FILE: &str = "4.0.regex";

pub const LEFT_WALL: &str = "LEFT-WALL";
pub const RIGHT_WALL: &str = "RIGHT-WALL";
pub const UNKNOWN_WORD: &str = "UNKNOWN-WORD";

const VERSION_MACRO: &str = "<dictionary-version-number>";
const LOCALE_MACRO: &str = "<dictionary-locale>";
const MAX_MACRO_DEPTH: usize = 64;

// ============================================================================
// WORD ENTRIES
// ============================================================================

/// One lexicon entry for a word form, e.g. `иду.v`.
#[derive(Debug, Clone)]
pub struct WordEntry {
    /// Form shown in diagrams, including any `.subscript`
    pub display: String,
    pub disjuncts: Vec<Disjunct>,
}

/// The lookup key of a dictionary word: `dog.n` is found as `dog`.
pub fn lookup_key(word: &str) -> &str {
    match word.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < word.len() => {
            let suffix = &word[pos + 1..];
            if suffix.chars().all(|c| c.is_alphanumeric() || c == '-') {
                &word[..pos]
            } else {
                word
            }
        }
        _ => word,
    }
}

// ============================================================================
// DICTIONARY
// ============================================================================

#[derive(Debug, Clone)]
pub struct Dictionary {
    language: String,
    path: PathBuf,
    entries: HashMap<String, Vec<WordEntry>>,
    regex_classes: RegexClasses,
    version: Option<String>,
    locale: Option<String>,
}

impl Dictionary {
    /// Load the dictionary for `language` from `<root>/<language>/`.
    pub fn load(language: &str, root: &Path) -> Result<Self> {
        if language.is_empty()
            || language.contains(['/', '\\'])
            || language == "."
            || language == ".."
        {
            return Err(LinkGrammarError::dictionary(
                language,
                root,
                "not a valid language code",
            ));
        }

        let dir = root.join(language);
        let dict_path = dir.join(DICT_FILE);
        debug!(language, path = %dict_path.display(), "resolving dictionary");

        if !dict_path.is_file() {
            return Err(LinkGrammarError::dictionary(
                language,
                root,
                format!("no {} in {}", DICT_FILE, dir.display()),
            ));
        }
        let dict_text = fs::read_to_string(&dict_path).map_err(|e| {
            LinkGrammarError::dictionary(
                language,
                root,
                format!("cannot read {}: {}", dict_path.display(), e),
            )
        })?;

        let regex_path = dir.join(REGEX_FILE);
        let regex_text = if regex_path.is_file() {
            Some(fs::read_to_string(&regex_path).map_err(|e| {
                LinkGrammarError::dictionary(
                    language,
                    root,
                    format!("cannot read {}: {}", regex_path.display(), e),
                )
            })?)
        } else {
            None
        };

        let mut dict = Self::build(language, root, &dict_text, regex_text.as_deref())?;
        dict.path = dir;
        Ok(dict)
    }

    /// Build a dictionary from in-memory text. `root` is only used for diagnostics.
    pub fn from_text(language: &str, dict_text: &str, regex_text: Option<&str>) -> Result<Self> {
        Self::build(language, Path::new("<memory>"), dict_text, regex_text)
    }

    fn build(
        language: &str,
        root: &Path,
        dict_text: &str,
        regex_text: Option<&str>,
    ) -> Result<Self> {
        let dict_name = format!("{}/{}", language, DICT_FILE);
        let fail = |reason: String, span: SourceSpan, label: &str| {
            LinkGrammarError::dictionary(language, root, reason)
                .with_location(DictionarySource::new(&dict_name, dict_text, span, label))
        };

        let raw = parser::parse(dict_text)
            .map_err(|e| fail(format!("malformed dictionary: {}", e.message), e.span, "here"))?;

        // Macros first, so entries may reference macros defined later in the file.
        let mut macros: HashMap<String, (Expr, SourceSpan)> = HashMap::new();
        for entry in &raw {
            for (word, span) in &entry.words {
                if word.starts_with('<') && word.ends_with('>') {
                    macros.insert(word.clone(), (entry.expr.clone(), *span));
                }
            }
        }

        let version = macros.get(VERSION_MACRO).map(|(e, _)| describe_metadata(e));
        let locale = macros.get(LOCALE_MACRO).map(|(e, _)| describe_metadata(e));

        let mut entries: HashMap<String, Vec<WordEntry>> = HashMap::new();
        for entry in &raw {
            let words: Vec<&(String, SourceSpan)> = entry
                .words
                .iter()
                .filter(|(w, _)| !(w.starts_with('<') && w.ends_with('>')))
                .collect();
            if words.is_empty() {
                continue;
            }

            let resolved = resolve_macros(&entry.expr, &macros, 0)
                .map_err(|msg| fail(msg, entry.span, "in this entry"))?;
            let disjuncts = expr::expand(&resolved)
                .map_err(|e| fail(e.to_string(), entry.span, "in this entry"))?;

            for (word, span) in words {
                if disjuncts.is_empty() {
                    return Err(fail(
                        format!("word '{}' has no disjuncts", word),
                        *span,
                        "defined here",
                    ));
                }
                entries
                    .entry(lookup_key(word).to_string())
                    .or_default()
                    .push(WordEntry {
                        display: word.clone(),
                        disjuncts: disjuncts.clone(),
                    });
            }
        }

        let left_wall_ok = entries
            .get(LEFT_WALL)
            .map(|es| es.iter().any(|e| e.disjuncts.iter().any(|d| d.left.is_empty())))
            .unwrap_or(false);
        if !left_wall_ok {
            return Err(fail(
                format!("{} is missing or has no right-pointing disjunct", LEFT_WALL),
                SourceSpan::from((0, 0)),
                "dictionary starts here",
            ));
        }

        let regex_classes = match regex_text {
            Some(text) => RegexClasses::parse(text).map_err(|e| {
                let reason = format!("malformed {}: {}", REGEX_FILE, e.message);
                let location = DictionarySource::new(
                    format!("{}/{}", language, REGEX_FILE),
                    text,
                    e.span,
                    "here",
                );
                LinkGrammarError::dictionary(language, root, reason).with_location(location)
            })?,
            None => RegexClasses::default(),
        };
        for class in regex_classes.names() {
            if !entries.contains_key(class) {
                return Err(LinkGrammarError::dictionary(
                    language,
                    root,
                    format!("regex class {} has no dictionary entry", class),
                ));
            }
        }

        debug!(language, words = entries.len(), "dictionary built");

        Ok(Self {
            language: language.to_string(),
            path: root.join(language),
            entries,
            regex_classes,
            version,
            locale,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Directory the dictionary was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of `<dictionary-version-number>`, if the dictionary declares one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Value of `<dictionary-locale>`, if the dictionary declares one.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Number of distinct lookup keys.
    pub fn num_words(&self) -> usize {
        self.entries.len()
    }

    /// Exact lexicon lookup.
    pub fn lookup(&self, word: &str) -> Option<&[WordEntry]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn has_right_wall(&self) -> bool {
        self.entries.contains_key(RIGHT_WALL)
    }

    pub fn regex_classes(&self) -> &RegexClasses {
        &self.regex_classes
    }
}

// ============================================================================
// MACRO RESOLUTION
// ============================================================================

fn resolve_macros(
    expr: &Expr,
    macros: &HashMap<String, (Expr, SourceSpan)>,
    depth: usize,
) -> std::result::Result<Expr, String> {
    if depth > MAX_MACRO_DEPTH {
        return Err("macro expansion is too deep (recursive macro?)".to_string());
    }
    let resolve_all = |items: &[Expr]| {
        items
            .iter()
            .map(|e| resolve_macros(e, macros, depth))
            .collect::<std::result::Result<Vec<_>, _>>()
    };
    Ok(match expr {
        Expr::Macro(name) => match macros.get(name) {
            Some((body, _)) => resolve_macros(body, macros, depth + 1)?,
            None => return Err(format!("macro {} is not defined", name)),
        },
        Expr::And(items) => Expr::And(resolve_all(items)?),
        Expr::Or(items) => Expr::Or(resolve_all(items)?),
        Expr::Optional(inner) => Expr::Optional(Box::new(resolve_macros(inner, macros, depth)?)),
        Expr::Cost(inner) => Expr::Cost(Box::new(resolve_macros(inner, macros, depth)?)),
        Expr::Connector(_) | Expr::Empty => expr.clone(),
    })
}

/// Metadata macros are written as a single connector, e.g. `V5v4v0+`.
fn describe_metadata(expr: &Expr) -> String {
    match expr {
        Expr::Connector(c) => c.name(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    const SMALL: &str = r#"
        <dictionary-version-number>: V1v0v0+;
        LEFT-WALL: Wd+;
        <subject>: {Wd-} & S+;
        dog.n cat.n: <subject> or J-;
        runs.v: S-;
    "#;

    #[test]
    fn lookup_key_strips_subscripts() {
        assert_eq!(lookup_key("dog.n"), "dog");
        assert_eq!(lookup_key("иду.v"), "иду");
        assert_eq!(lookup_key("."), ".");
        assert_eq!(lookup_key("..."), "...");
        assert_eq!(lookup_key("e.g."), "e.g.");
        assert_eq!(lookup_key("LEFT-WALL"), "LEFT-WALL");
    }

    #[test]
    fn builds_entries_and_metadata() {
        let dict = Dictionary::from_text("xx", SMALL, None).unwrap();
        assert_eq!(dict.version(), Some("V1v0v0"));
        let dog = dict.lookup("dog").unwrap();
        assert_eq!(dog[0].display, "dog.n");
        assert_eq!(dog[0].disjuncts.len(), 3);
        assert!(dict.lookup("<subject>").is_none());
        assert!(!dict.has_right_wall());
    }

    #[test]
    fn undefined_macro_is_a_dictionary_error() {
        let err = Dictionary::from_text("xx", "LEFT-WALL: Wd+;\ndog: <noun>;", None).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DictionaryNotFound);
        assert!(err.to_string().contains("<noun>"));
    }

    #[test]
    fn recursive_macro_is_rejected() {
        let err = Dictionary::from_text("xx", "LEFT-WALL: Wd+;\n<a>: <a> & S+;\ndog: <a>;", None)
            .unwrap_err();
        assert!(err.to_string().contains("too deep"));
    }

    #[test]
    fn missing_left_wall_is_rejected() {
        let err = Dictionary::from_text("xx", "dog: S+;", None).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DictionaryNotFound);
    }

    #[test]
    fn regex_classes_need_entries() {
        let err = Dictionary::from_text("xx", SMALL, Some("NUMBERS: /^[0-9]+$/;\n")).unwrap_err();
        assert!(err.to_string().contains("NUMBERS"));

        let text = format!("{}\nNUMBERS: J-;", SMALL);
        let dict = Dictionary::from_text("xx", &text, Some("NUMBERS: /^[0-9]+$/;\n")).unwrap();
        assert_eq!(dict.regex_classes().classify("42"), Some("NUMBERS"));
    }

    #[test]
    fn load_reports_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let err = Dictionary::load("zz", root.path()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DictionaryNotFound);

        let err = Dictionary::load("../etc", root.path()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DictionaryNotFound);
    }

    #[test]
    fn load_reads_dictionary_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("xx");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join(DICT_FILE), SMALL).unwrap();
        let dict = Dictionary::load("xx", root.path()).unwrap();
        assert_eq!(dict.language(), "xx");
        assert_eq!(dict.path(), dir.as_path());
        assert!(dict.contains("runs"));
    }
}
