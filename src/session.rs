//! Parser sessions.
//!
//! A [`ParserSession`] binds one dictionary and one option set and holds at most
//! one live [`LinkageSet`]. Its state is derived from what it holds:
//!
//! | holds                          | state             |
//! |--------------------------------|-------------------|
//! | nothing (released)             | `Closed`          |
//! | dictionary only                | `Created`         |
//! | linkage set, nothing selected  | `Parsed`          |
//! | linkage set with a selection   | `LinkageSelected` |
//!
//! Linkages are handed out as borrows of the session, so a linkage obtained
//! before a new `parse()` cannot be used after it.

use std::{fmt, str, sync::Arc};

use serde::Serialize;
use tracing::debug;

use crate::{
    catalog::DictionaryCatalog,
    dictionary::Dictionary,
    engine::{LinkEngine, ParseEngine},
    error::{LinkGrammarError, Result},
    linkage::{Linkage, LinkageSet},
    options::{OptionName, OptionValue, ParseOptions},
    render,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionState {
    Created,
    Parsed,
    LinkageSelected,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Created => "Created",
            SessionState::Parsed => "Parsed",
            SessionState::LinkageSelected => "LinkageSelected",
            SessionState::Closed => "Closed",
        };
        f.write_str(name)
    }
}

/// Counts reported by [`ParserSession::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub num_linkages: usize,
    pub num_valid: usize,
    /// Linkages that exist before the `max_linkages` cap, saturating at
    /// `u64::MAX`
    pub num_linkages_found: u64,
    pub null_count: usize,
    pub timer_expired: bool,
}

impl ParseSummary {
    fn of(set: &LinkageSet) -> Self {
        Self {
            num_linkages: set.num_linkages(),
            num_valid: set.num_valid(),
            num_linkages_found: set.num_linkages_found(),
            null_count: set.null_count(),
            timer_expired: set.timer_expired(),
        }
    }
}

/// What a live session owns.
#[derive(Debug)]
struct Bound {
    language: String,
    dictionary: Arc<Dictionary>,
    options: ParseOptions,
    linkages: Option<LinkageSet>,
}

#[derive(Debug)]
pub struct ParserSession {
    engine: Arc<dyn ParseEngine>,
    inner: Option<Bound>,
}

impl ParserSession {
    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Session over `language`, resolved through the process-wide catalog.
    pub fn create(language: &str) -> Result<Self> {
        Self::create_in(DictionaryCatalog::global(), language)
    }

    /// Session over `language`, resolved through `catalog`.
    pub fn create_in(catalog: &DictionaryCatalog, language: &str) -> Result<Self> {
        let dictionary = catalog.load(language)?;
        debug!(language, "session created");
        Ok(Self {
            engine: Arc::new(LinkEngine),
            inner: Some(Bound {
                language: language.to_string(),
                dictionary,
                options: ParseOptions::default(),
                linkages: None,
            }),
        })
    }

    /// Replace the parse engine.
    pub fn with_engine(mut self, engine: Arc<dyn ParseEngine>) -> Self {
        self.engine = engine;
        self
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn state(&self) -> SessionState {
        match &self.inner {
            None => SessionState::Closed,
            Some(Bound { linkages: None, .. }) => SessionState::Created,
            Some(Bound { linkages: Some(set), .. }) if set.selected_index().is_some() => {
                SessionState::LinkageSelected
            }
            Some(_) => SessionState::Parsed,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Engine identifier; always starts with `link-grammar`.
    pub fn version(&self) -> Result<String> {
        self.bound("version")?;
        Ok(self.engine.version())
    }

    /// The language code the session was created with.
    pub fn dictionary(&self) -> Result<&str> {
        Ok(&self.bound("dictionary")?.language)
    }

    /// The loaded dictionary itself.
    pub fn dictionary_handle(&self) -> Result<&Arc<Dictionary>> {
        Ok(&self.bound("dictionary_handle")?.dictionary)
    }

    // ========================================================================
    // OPTIONS
    // ========================================================================

    pub fn get_option(&self, name: &str) -> Result<OptionValue> {
        let bound = self.bound("get_option")?;
        let name: OptionName = name.parse()?;
        Ok(bound.options.get(name))
    }

    /// Validate and store one option. Applies to later parses only.
    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let bound = self.bound_mut("set_option")?;
        let name: OptionName = name.parse()?;
        bound.options.set(name, value.into())?;
        debug!(option = %name, "option set");
        Ok(())
    }

    pub fn options(&self) -> Result<&ParseOptions> {
        Ok(&self.bound("options")?.options)
    }

    /// Replace every option at once.
    pub fn set_options(&mut self, options: ParseOptions) -> Result<()> {
        let bound = self.bound_mut("set_options")?;
        options.validate()?;
        bound.options = options;
        Ok(())
    }

    // ========================================================================
    // PARSING
    // ========================================================================

    /// Parse `sentence`, replacing any previous linkage set.
    pub fn parse(&mut self, sentence: &str) -> Result<ParseSummary> {
        let engine = Arc::clone(&self.engine);
        let bound = self.bound_mut("parse")?;

        let set = if sentence.trim().is_empty() {
            LinkageSet::empty(sentence)
        } else {
            let outcome = engine.parse(&bound.dictionary, sentence, &bound.options)?;
            LinkageSet::new(
                sentence,
                outcome.linkages,
                outcome.num_found,
                outcome.null_count,
                outcome.timer_expired,
            )
        };
        let summary = ParseSummary::of(&set);
        debug!(
            num_linkages = summary.num_linkages,
            num_valid = summary.num_valid,
            "parse finished"
        );
        bound.linkages = Some(set);
        Ok(summary)
    }

    /// Parse raw bytes, which must be UTF-8.
    pub fn parse_bytes(&mut self, sentence: &[u8]) -> Result<ParseSummary> {
        self.bound("parse")?;
        let text = str::from_utf8(sentence).map_err(|e| {
            LinkGrammarError::parse(format!("sentence is not valid UTF-8: {}", e))
        })?;
        self.parse(text)
    }

    /// The linkage set of the last parse.
    pub fn linkage_set(&self) -> Result<&LinkageSet> {
        let state = self.state();
        self.bound("linkage_set")?
            .linkages
            .as_ref()
            .ok_or(LinkGrammarError::State {
                operation: "linkage_set",
                state,
            })
    }

    /// Select linkage `index` of the current linkage set.
    pub fn select_linkage(&mut self, index: i64) -> Result<&Linkage> {
        let state = self.state();
        let set = self
            .bound_mut("select_linkage")?
            .linkages
            .as_mut()
            .ok_or(LinkGrammarError::State {
                operation: "select_linkage",
                state,
            })?;
        set.select(index)
    }

    /// The selected linkage, if any.
    pub fn selected_linkage(&self) -> Result<Option<&Linkage>> {
        let bound = self.bound("selected_linkage")?;
        Ok(bound.linkages.as_ref().and_then(LinkageSet::selected))
    }

    /// Drop the current linkage set, returning to `Created`.
    pub fn clear(&mut self) -> Result<()> {
        self.bound_mut("clear")?.linkages = None;
        Ok(())
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    /// Text diagram of the selected linkage.
    pub fn diagram(&self) -> Result<String> {
        let (linkage, options) = self.selection("diagram")?;
        Ok(render::diagram(linkage, options))
    }

    /// PostScript document of the selected linkage.
    pub fn postscript(&self) -> Result<String> {
        let (linkage, options) = self.selection("postscript")?;
        Ok(render::postscript(linkage, options))
    }

    fn selection(&self, operation: &'static str) -> Result<(&Linkage, &ParseOptions)> {
        let state = self.state();
        let bound = self.bound(operation)?;
        let linkage = bound
            .linkages
            .as_ref()
            .and_then(LinkageSet::selected)
            .ok_or(LinkGrammarError::State { operation, state })?;
        Ok((linkage, &bound.options))
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Release the dictionary and any linkage set. Calling it again does nothing.
    pub fn release(&mut self) {
        if let Some(bound) = self.inner.take() {
            debug!(language = %bound.language, "session released");
        }
    }

    fn bound(&self, operation: &'static str) -> Result<&Bound> {
        self.inner
            .as_ref()
            .ok_or(LinkGrammarError::SessionClosed { operation })
    }

    fn bound_mut(&mut self, operation: &'static str) -> Result<&mut Bound> {
        self.inner
            .as_mut()
            .ok_or(LinkGrammarError::SessionClosed { operation })
    }
}

impl Drop for ParserSession {
    fn drop(&mut self) {
        self.release();
    }
}
