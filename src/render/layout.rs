//! Word placement and link heights shared by the text and PostScript renderers.

use unicode_width::UnicodeWidthStr;

use crate::linkage::Linkage;

/// Columns between the ends of a link beyond its label: `+-` and `-+`.
const LABEL_PADDING: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedWord {
    pub text: String,
    /// First column of the word
    pub start: usize,
    /// Display width in columns
    pub width: usize,
}

impl PlacedWord {
    /// Column link ends attach to.
    pub fn anchor(&self) -> usize {
        self.start + self.width.saturating_sub(1) / 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLink {
    /// Indices into [`Layout::words`]
    pub left: usize,
    pub right: usize,
    pub label: String,
    /// 1 for the lowest row of arcs
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub words: Vec<PlacedWord>,
    pub links: Vec<PlacedLink>,
    pub width: usize,
    pub max_height: usize,
}

impl Layout {
    pub fn new(linkage: &Linkage, display_walls: bool) -> Self {
        // Visible word index for every linkage word.
        let mut visible: Vec<Option<usize>> = Vec::with_capacity(linkage.num_words());
        let mut texts = Vec::new();
        for word in linkage.words() {
            if word.is_wall && !display_walls {
                visible.push(None);
            } else {
                visible.push(Some(texts.len()));
                texts.push(word.text.clone());
            }
        }

        let mut links: Vec<PlacedLink> = linkage
            .links()
            .iter()
            .filter_map(|l| {
                Some(PlacedLink {
                    left: visible[l.left]?,
                    right: visible[l.right]?,
                    label: l.label.clone(),
                    height: 0,
                })
            })
            .collect();
        assign_heights(&mut links);

        let words = place_words(texts, &links);
        let width = words.last().map(|w| w.start + w.width).unwrap_or(0);
        let max_height = links.iter().map(|l| l.height).max().unwrap_or(0);
        Self {
            words,
            links,
            width,
            max_height,
        }
    }
}

/// A link sits one row above the highest link it encloses.
fn assign_heights(links: &mut [PlacedLink]) {
    links.sort_by_key(|l| (l.right - l.left, l.left));
    for i in 0..links.len() {
        let (left, right) = (links[i].left, links[i].right);
        let inner = links[..i]
            .iter()
            .filter(|o| o.left >= left && o.right <= right)
            .map(|o| o.height)
            .max()
            .unwrap_or(0);
        links[i].height = inner + 1;
    }
    links.sort_by_key(|l| (l.left, l.right));
}

/// Lay words out left to right, one space apart, pushing a word further right
/// when a link ending at it would not fit its label.
fn place_words(texts: Vec<String>, links: &[PlacedLink]) -> Vec<PlacedWord> {
    let mut words: Vec<PlacedWord> = Vec::with_capacity(texts.len());
    for (i, text) in texts.into_iter().enumerate() {
        let width = UnicodeWidthStr::width(text.as_str()).max(1);
        let mut start = words.last().map(|w| w.start + w.width + 1).unwrap_or(0);

        for link in links.iter().filter(|l| l.right == i) {
            let from = words[link.left].anchor();
            let need = from + UnicodeWidthStr::width(link.label.as_str()) + LABEL_PADDING;
            let centre_offset = width.saturating_sub(1) / 2;
            start = start.max(need.saturating_sub(centre_offset));
        }
        words.push(PlacedWord { text, start, width });
    }
    words
}
