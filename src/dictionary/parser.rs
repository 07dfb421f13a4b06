//! Dictionary Parser
//!
//! Converts dictionary text into raw entries (word lists plus unexpanded
//! expressions). Purely syntactic: macro resolution and disjunct expansion
//! happen in the dictionary loader.

use miette::SourceSpan;
use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use super::expr::{Connector, Expr};

#[derive(Parser)]
#[grammar = "dictionary/dict.pest"]
struct DictParser;

/// One `words: expression;` entry, with byte spans for diagnostics.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub words: Vec<(String, SourceSpan)>,
    pub expr: Expr,
    pub span: SourceSpan,
}

/// A syntax error with its location in the dictionary text.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub span: SourceSpan,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse dictionary text into raw entries.
pub fn parse(text: &str) -> Result<Vec<RawEntry>, SyntaxError> {
    let mut pairs = DictParser::parse(Rule::file, text).map_err(convert_parse_error)?;
    let Some(file) = pairs.next() else {
        return Ok(Vec::new());
    };

    file.into_inner()
        .filter(|p| p.as_rule() == Rule::entry)
        .map(build_entry)
        .collect()
}

// ============================================================================
// BUILDERS
// ============================================================================

fn build_entry(pair: Pair<Rule>) -> Result<RawEntry, SyntaxError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();

    let words = match inner.next() {
        Some(list) if list.as_rule() == Rule::word_list => list
            .into_inner()
            .map(|w| {
                let span = span_of(&w);
                let text = match w.as_rule() {
                    Rule::quoted_word => w.as_str().trim_matches('"').to_string(),
                    _ => w.as_str().to_string(),
                };
                (text, span)
            })
            .collect(),
        _ => return Err(malformed("entry without words", span)),
    };

    let expr = match inner.next() {
        Some(expr) => build_expr(expr)?,
        None => return Err(malformed("entry without expression", span)),
    };

    Ok(RawEntry { words, expr, span })
}

fn build_expr(pair: Pair<Rule>) -> Result<Expr, SyntaxError> {
    let span = span_of(&pair);
    match pair.as_rule() {
        Rule::expr => {
            let mut items = pair
                .into_inner()
                .map(build_expr)
                .collect::<Result<Vec<_>, _>>()?;
            if items.len() == 1 {
                Ok(items.remove(0))
            } else {
                Ok(Expr::Or(items))
            }
        }
        Rule::and_expr => {
            let mut items = pair
                .into_inner()
                .map(build_expr)
                .collect::<Result<Vec<_>, _>>()?;
            if items.len() == 1 {
                Ok(items.remove(0))
            } else {
                Ok(Expr::And(items))
            }
        }
        Rule::connector => Connector::parse(pair.as_str())
            .map(Expr::Connector)
            .ok_or_else(|| malformed(format!("invalid connector '{}'", pair.as_str()), span)),
        Rule::empty => Ok(Expr::Empty),
        Rule::group => single_child(pair, span),
        Rule::optional => Ok(Expr::Optional(Box::new(single_child(pair, span)?))),
        Rule::cost => Ok(Expr::Cost(Box::new(single_child(pair, span)?))),
        Rule::macro_ref => Ok(Expr::Macro(pair.as_str().to_string())),
        other => Err(malformed(format!("unexpected {:?}", other), span)),
    }
}

fn single_child(pair: Pair<Rule>, span: SourceSpan) -> Result<Expr, SyntaxError> {
    match pair.into_inner().next() {
        Some(inner) => build_expr(inner),
        None => Err(malformed("empty group", span)),
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn span_of(pair: &Pair<Rule>) -> SourceSpan {
    let span = pair.as_span();
    SourceSpan::from((span.start(), span.end() - span.start()))
}

fn malformed(message: impl Into<String>, span: SourceSpan) -> SyntaxError {
    SyntaxError {
        message: message.into(),
        span,
    }
}

fn convert_parse_error(error: Error<Rule>) -> SyntaxError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => SourceSpan::from((pos, 0)),
        pest::error::InputLocation::Span((start, end)) => SourceSpan::from((start, end - start)),
    };

    let rendered = error.variant.message().to_string();
    let message = if rendered.contains("expected") && rendered.contains("entry") {
        "expected a dictionary entry `words: expression;`".to_string()
    } else {
        format!("syntax error: {}", rendered)
    };

    SyntaxError { message, span }
}
