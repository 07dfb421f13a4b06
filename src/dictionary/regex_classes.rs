//! Regex word classes (`4.0.regex`).
//!
//! Each line `CLASS-NAME: /pattern/;` maps words the lexicon does not contain
//! to a dictionary entry named `CLASS-NAME`. Classes are tried in file order.

use miette::SourceSpan;
use regex::Regex;

/// A named word class.
#[derive(Debug, Clone)]
pub struct RegexClass {
    pub name: String,
    pub pattern: Regex,
}

/// Ordered list of regex word classes.
#[derive(Debug, Clone, Default)]
pub struct RegexClasses {
    classes: Vec<RegexClass>,
}

/// A malformed line, with its byte span in the regex file.
#[derive(Debug, Clone)]
pub struct RegexFileError {
    pub message: String,
    pub span: SourceSpan,
}

impl RegexClasses {
    pub fn parse(text: &str) -> Result<Self, RegexFileError> {
        let mut classes = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let span = SourceSpan::from((offset, line.trim_end().len()));
            offset += line.len();

            let content = line.trim();
            if content.is_empty() || content.starts_with('%') {
                continue;
            }

            let Some((name, source)) = split_line(content) else {
                return Err(RegexFileError {
                    message: "expected `CLASS-NAME: /pattern/;`".to_string(),
                    span,
                });
            };
            let pattern = Regex::new(source).map_err(|e| RegexFileError {
                message: format!("invalid pattern for {}: {}", name, e),
                span,
            })?;
            classes.push(RegexClass {
                name: name.to_string(),
                pattern,
            });
        }
        Ok(Self { classes })
    }

    /// The first class whose pattern matches `word`.
    pub fn classify(&self, word: &str) -> Option<&str> {
        self.classes
            .iter()
            .find(|class| class.pattern.is_match(word))
            .map(|class| class.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Split `NAME: /pattern/;` into its name and pattern.
fn split_line(content: &str) -> Option<(&str, &str)> {
    let (name, rest) = content.split_once(':')?;
    let name = name.trim();
    let valid_name = name.starts_with(|c: char| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid_name {
        return None;
    }
    let pattern = rest
        .trim()
        .strip_suffix(';')?
        .trim_end()
        .strip_prefix('/')?
        .strip_suffix('/')?;
    Some((name, pattern))
}
