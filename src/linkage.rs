//! Linkages and the per-parse linkage set.

use serde::Serialize;

use crate::error::{LinkGrammarError, Result};

// ============================================================================
// LINKAGE
// ============================================================================

/// A link between two words of a linkage. `left < right`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub left: usize,
    pub right: usize,
    /// Combined link label, e.g. `Ss`
    pub label: String,
    /// Connector used on the left word, e.g. `Ss+`
    pub left_connector: String,
    /// Connector used on the right word, e.g. `S-`
    pub right_connector: String,
}

impl Link {
    pub fn length(&self) -> usize {
        self.right - self.left
    }
}

/// A word position in a linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkageWord {
    /// Text shown in diagrams (`иду.v`, `LEFT-WALL`, `[foo]` for null words)
    pub text: String,
    pub is_wall: bool,
    /// The word takes part in no link
    pub is_null: bool,
    /// Chosen disjunct, as connector text
    pub disjunct: Option<String>,
    pub cost: u32,
}

/// One candidate link structure over the words of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Linkage {
    words: Vec<LinkageWord>,
    links: Vec<Link>,
    null_count: usize,
    disjunct_cost: u32,
    link_cost: usize,
}

impl Linkage {
    pub fn new(words: Vec<LinkageWord>, mut links: Vec<Link>) -> Self {
        links.sort_by(|a, b| (a.left, a.right).cmp(&(b.left, b.right)));
        let null_count = words.iter().filter(|w| w.is_null).count();
        let disjunct_cost = words.iter().map(|w| w.cost).sum();
        let link_cost = links.iter().map(|l| l.length().saturating_sub(1)).sum();
        Self {
            words,
            links,
            null_count,
            disjunct_cost,
            link_cost,
        }
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[LinkageWord] {
        &self.words
    }

    pub fn word(&self, index: usize) -> Option<&LinkageWord> {
        self.words.get(index)
    }

    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    /// Words left unlinked.
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    pub fn disjunct_cost(&self) -> u32 {
        self.disjunct_cost
    }

    /// Sum over links of the number of words each link skips.
    pub fn link_cost(&self) -> usize {
        self.link_cost
    }

    /// A valid linkage links every word.
    pub fn is_valid(&self) -> bool {
        self.null_count == 0
    }

    /// Chosen disjunct per word (`None` for null words).
    pub fn disjuncts(&self) -> impl Iterator<Item = Option<&str>> {
        self.words.iter().map(|w| w.disjunct.as_deref())
    }

    /// Ordering key: fewer null words, then cheaper disjuncts, then shorter links.
    pub(crate) fn rank_key(&self) -> (usize, u32, usize) {
        (self.null_count, self.disjunct_cost, self.link_cost)
    }
}

// ============================================================================
// LINKAGE SET
// ============================================================================

/// Everything one `parse()` produced.
#[derive(Debug, Clone)]
pub struct LinkageSet {
    sentence: String,
    linkages: Vec<Linkage>,
    num_found: u64,
    null_count: usize,
    timer_expired: bool,
    selected: Option<usize>,
}

impl LinkageSet {
    pub fn new(
        sentence: impl Into<String>,
        linkages: Vec<Linkage>,
        num_found: u64,
        null_count: usize,
        timer_expired: bool,
    ) -> Self {
        Self {
            sentence: sentence.into(),
            linkages,
            num_found,
            null_count,
            timer_expired,
            selected: None,
        }
    }

    /// The set produced for an empty sentence.
    pub fn empty(sentence: impl Into<String>) -> Self {
        Self::new(sentence, Vec::new(), 0, 0, false)
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Linkages available for selection (at most `max_linkages`).
    pub fn num_linkages(&self) -> usize {
        self.linkages.len()
    }

    /// Linkages that exist, before the `max_linkages` cap.
    ///
    /// The count saturates: `u64::MAX` means "at least `u64::MAX`". Sampling
    /// and extraction stay exact below that bound.
    pub fn num_linkages_found(&self) -> u64 {
        self.num_found
    }

    pub fn num_valid(&self) -> usize {
        self.linkages.iter().filter(|l| l.is_valid()).count()
    }

    /// Null words every linkage of this set has.
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// The parse ran out of time; the set holds no linkages.
    pub fn timer_expired(&self) -> bool {
        self.timer_expired
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Linkage> {
        self.selected.and_then(|i| self.linkages.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Linkage> {
        self.linkages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Linkage> {
        self.linkages.iter()
    }

    /// Validate `index` and make it the current selection.
    ///
    /// Negative indices underflow; indices at or past `num_linkages` are out of
    /// bounds. On failure the current selection is unchanged.
    pub fn select(&mut self, index: i64) -> Result<&Linkage> {
        if index < 0 {
            return Err(LinkGrammarError::RangeUnderflow { index });
        }
        let position = usize::try_from(index)
            .ok()
            .filter(|&i| i < self.linkages.len())
            .ok_or(LinkGrammarError::RangeOutOfBounds {
                index,
                num_linkages: self.linkages.len(),
            })?;
        self.selected = Some(position);
        Ok(&self.linkages[position])
    }
}

impl<'a> IntoIterator for &'a LinkageSet {
    type Item = &'a Linkage;
    type IntoIter = std::slice::Iter<'a, Linkage>;

    fn into_iter(self) -> Self::IntoIter {
        self.linkages.iter()
    }
}
