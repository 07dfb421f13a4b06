//! Linkage search.
//!
//! Counts planar, connected linkages with the classic region recursion: a region
//! is a pair of boundary words plus the connectors each still has to satisfy
//! towards the other, and the number of null words allowed inside. Counts are
//! memoised per region. Because counting and extraction enumerate the same
//! alternatives in the same order, the `i`-th linkage can be rebuilt directly
//! from its index.

use std::{collections::HashMap, time::Instant};

use super::tokenize::SentenceWord;
use crate::dictionary::Connector;
use crate::linkage::{Link, Linkage, LinkageWord};

/// Calls between two deadline checks.
const DEADLINE_STRIDE: u64 = 256;

/// The deadline passed while counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerExpired;

/// Position in a connector list: `cand` picks the word's candidate, `pos` the
/// connector. Lists are farthest-first, so the connector at `pos` is the one
/// that links farthest among those still unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Cursor {
    cand: usize,
    pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Region {
    lw: usize,
    rw: usize,
    /// Remaining right-pointing connectors of `lw`
    le: Option<Cursor>,
    /// Remaining left-pointing connectors of `rw`
    re: Option<Cursor>,
    nulls: usize,
}

/// A link formed by one alternative: `lc` is in `lw`'s right list, `rc` in
/// `rw`'s left list.
#[derive(Debug, Clone, Copy)]
struct LinkRef {
    lw: usize,
    lc: Cursor,
    rw: usize,
    rc: Cursor,
}

/// One way to split a region: `word` takes candidate `cand`, `links` are formed
/// and the two `parts` are solved independently.
#[derive(Debug, Clone)]
struct Alternative {
    word: usize,
    cand: usize,
    links: Vec<LinkRef>,
    parts: [Region; 2],
}

pub struct Search<'a> {
    words: &'a [SentenceWord],
    nulls: usize,
    deadline: Option<Instant>,
    memo: HashMap<Region, u64>,
    calls: u64,
}

impl<'a> Search<'a> {
    pub fn new(words: &'a [SentenceWord], nulls: usize, deadline: Option<Instant>) -> Self {
        Self {
            words,
            nulls,
            deadline,
            memo: HashMap::new(),
            calls: 0,
        }
    }

    // ========================================================================
    // COUNTING
    // ========================================================================

    /// Total number of linkages with exactly `nulls` null words, saturating at
    /// `u64::MAX`.
    pub fn count_linkages(&mut self) -> Result<u64, TimerExpired> {
        let mut total: u64 = 0;
        for root in self.roots() {
            total = total.saturating_add(self.count(root.1)?);
        }
        Ok(total)
    }

    /// Start regions: one per LEFT-WALL candidate with no left connectors.
    fn roots(&self) -> Vec<(usize, Region)> {
        let end = self.words.len();
        self.words[0]
            .candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.disjunct.left.is_empty())
            .map(|(ci, _)| {
                (
                    ci,
                    Region {
                        lw: 0,
                        rw: end,
                        le: self.first_right(0, ci),
                        re: None,
                        nulls: self.nulls,
                    },
                )
            })
            .collect()
    }

    fn count(&mut self, r: Region) -> Result<u64, TimerExpired> {
        if let Some(base) = self.base_case(&r) {
            return Ok(base);
        }
        if let Some(&known) = self.memo.get(&r) {
            return Ok(known);
        }

        self.calls += 1;
        if self.calls % DEADLINE_STRIDE == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return Err(TimerExpired);
                }
            }
        }

        let mut total: u64 = 0;
        for alt in self.alternatives(&r) {
            let first = self.count(alt.parts[0])?;
            if first == 0 {
                continue;
            }
            let second = self.count(alt.parts[1])?;
            total = total.saturating_add(first.saturating_mul(second));
        }
        self.memo.insert(r, total);
        Ok(total)
    }

    /// Regions whose count needs no recursion.
    fn base_case(&self, r: &Region) -> Option<u64> {
        let inner = r.rw - r.lw - 1;
        if r.nulls > inner {
            return Some(0);
        }
        if inner == 0 {
            return Some(u64::from(r.le.is_none() && r.re.is_none() && r.nulls == 0));
        }
        if r.le.is_none() && r.re.is_none() {
            return Some(u64::from(r.nulls == inner));
        }
        None
    }

    fn alternatives(&self, r: &Region) -> Vec<Alternative> {
        let mut alts = Vec::new();
        for w in (r.lw + 1)..r.rw {
            for cand in 0..self.words[w].candidates.len() {
                let dl = self.first_left(w, cand);
                let dr = self.first_right(w, cand);
                let left_link = self.matching(r.lw, r.le, w, dl);
                let right_link = self.matching(w, dr, r.rw, r.re);

                // With `le` pending, `w` must be its partner; otherwise `w`
                // must be the partner of `re`.
                match (r.le, left_link, right_link) {
                    (Some(_), None, _) | (None, _, None) => continue,
                    _ => {}
                }

                let left_variants = left_link.map(|l| self.variants(l)).unwrap_or_default();
                let right_variants = right_link.map(|l| self.variants(l)).unwrap_or_default();

                for lnull in 0..=r.nulls {
                    let rnull = r.nulls - lnull;
                    let Some(link_l) = left_link else {
                        // Only `re` links to `w`.
                        let left = Region {
                            lw: r.lw,
                            rw: w,
                            le: None,
                            re: dl,
                            nulls: lnull,
                        };
                        for &(le, re) in &right_variants {
                            let right = Region {
                                lw: w,
                                rw: r.rw,
                                le,
                                re,
                                nulls: rnull,
                            };
                            alts.push(Alternative {
                                word: w,
                                cand,
                                links: right_link.into_iter().collect(),
                                parts: [left, right],
                            });
                        }
                        continue;
                    };

                    for &(le, re) in &left_variants {
                        let left = Region {
                            lw: r.lw,
                            rw: w,
                            le,
                            re,
                            nulls: lnull,
                        };
                        if let Some(link_r) = right_link {
                            for &(le, re) in &right_variants {
                                let right = Region {
                                    lw: w,
                                    rw: r.rw,
                                    le,
                                    re,
                                    nulls: rnull,
                                };
                                alts.push(Alternative {
                                    word: w,
                                    cand,
                                    links: vec![link_l, link_r],
                                    parts: [left, right],
                                });
                            }
                        }
                        let right = Region {
                            lw: w,
                            rw: r.rw,
                            le: dr,
                            re: r.re,
                            nulls: rnull,
                        };
                        alts.push(Alternative {
                            word: w,
                            cand,
                            links: vec![link_l],
                            parts: [left, right],
                        });
                    }
                }
            }
        }
        alts
    }

    /// The link formed by the head connectors `a` (right list of `aw`) and `b`
    /// (left list of `bw`), if they match.
    fn matching(
        &self,
        aw: usize,
        a: Option<Cursor>,
        bw: usize,
        b: Option<Cursor>,
    ) -> Option<LinkRef> {
        let (a, b) = (a?, b?);
        self.right_conn(aw, a)
            .links_to(self.left_conn(bw, b))
            .then_some(LinkRef {
                lw: aw,
                lc: a,
                rw: bw,
                rc: b,
            })
    }

    /// Ways the two lists continue after `link`. Multi connectors may stay in
    /// place and link again.
    fn variants(&self, link: LinkRef) -> Vec<(Option<Cursor>, Option<Cursor>)> {
        let a_multi = self.right_conn(link.lw, link.lc).is_multi();
        let b_multi = self.left_conn(link.rw, link.rc).is_multi();
        let a_next = self.next_right(link.lw, link.lc);
        let b_next = self.next_left(link.rw, link.rc);

        let mut out = vec![(a_next, b_next)];
        if a_multi {
            out.push((Some(link.lc), b_next));
        }
        if b_multi {
            out.push((a_next, Some(link.rc)));
        }
        if a_multi && b_multi {
            out.push((Some(link.lc), Some(link.rc)));
        }
        out
    }

    // ========================================================================
    // EXTRACTION
    // ========================================================================

    /// Rebuild linkage number `index` (`index < count_linkages()`).
    pub fn extract(&mut self, index: u64) -> Result<Option<Linkage>, TimerExpired> {
        let mut choice: Vec<Option<usize>> = vec![None; self.words.len()];
        let mut links: Vec<LinkRef> = Vec::new();
        let mut remaining = index;

        for (ci, root) in self.roots() {
            let c = self.count(root)?;
            if remaining < c {
                choice[0] = Some(ci);
                self.extract_region(root, remaining, &mut choice, &mut links)?;
                return Ok(Some(self.build_linkage(&choice, &links)));
            }
            remaining -= c;
        }
        Ok(None)
    }

    fn extract_region(
        &mut self,
        r: Region,
        mut index: u64,
        choice: &mut [Option<usize>],
        links: &mut Vec<LinkRef>,
    ) -> Result<(), TimerExpired> {
        if self.base_case(&r).is_some() {
            return Ok(());
        }
        for alt in self.alternatives(&r) {
            let first = self.count(alt.parts[0])?;
            if first == 0 {
                continue;
            }
            let second = self.count(alt.parts[1])?;
            let here = first.saturating_mul(second);
            if index < here {
                choice[alt.word] = Some(alt.cand);
                links.extend(alt.links.iter().copied());
                self.extract_region(alt.parts[0], index / second, choice, links)?;
                self.extract_region(alt.parts[1], index % second, choice, links)?;
                return Ok(());
            }
            index -= here;
        }
        Ok(())
    }

    fn build_linkage(&self, choice: &[Option<usize>], refs: &[LinkRef]) -> Linkage {
        let words = self
            .words
            .iter()
            .zip(choice)
            .map(|(word, chosen)| match chosen {
                Some(ci) => {
                    let cand = &word.candidates[*ci];
                    LinkageWord {
                        text: cand.display.clone(),
                        is_wall: word.is_wall(),
                        is_null: false,
                        disjunct: Some(cand.disjunct.to_string()),
                        cost: cand.disjunct.cost,
                    }
                }
                None => LinkageWord {
                    text: format!("[{}]", word.token),
                    is_wall: word.is_wall(),
                    is_null: true,
                    disjunct: None,
                    cost: 0,
                },
            })
            .collect();

        let links = refs
            .iter()
            .map(|l| {
                let left = self.right_conn(l.lw, l.lc);
                let right = self.left_conn(l.rw, l.rc);
                Link {
                    left: l.lw,
                    right: l.rw,
                    label: left.link_label(right),
                    left_connector: left.to_string(),
                    right_connector: right.to_string(),
                }
            })
            .collect();

        Linkage::new(words, links)
    }

    // ========================================================================
    // CONNECTOR ACCESS
    // ========================================================================

    fn right_conn(&self, word: usize, c: Cursor) -> &'a Connector {
        &self.words[word].candidates[c.cand].disjunct.right[c.pos]
    }

    fn left_conn(&self, word: usize, c: Cursor) -> &'a Connector {
        &self.words[word].candidates[c.cand].disjunct.left[c.pos]
    }

    fn first_right(&self, word: usize, cand: usize) -> Option<Cursor> {
        let len = self.words[word].candidates[cand].disjunct.right.len();
        (len > 0).then_some(Cursor { cand, pos: 0 })
    }

    fn first_left(&self, word: usize, cand: usize) -> Option<Cursor> {
        let len = self.words[word].candidates[cand].disjunct.left.len();
        (len > 0).then_some(Cursor { cand, pos: 0 })
    }

    fn next_right(&self, word: usize, c: Cursor) -> Option<Cursor> {
        let len = self.words[word].candidates[c.cand].disjunct.right.len();
        (c.pos + 1 < len).then_some(Cursor {
            cand: c.cand,
            pos: c.pos + 1,
        })
    }

    fn next_left(&self, word: usize, c: Cursor) -> Option<Cursor> {
        let len = self.words[word].candidates[c.cand].disjunct.left.len();
        (c.pos + 1 < len).then_some(Cursor {
            cand: c.cand,
            pos: c.pos + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::engine::tokenize::{build_words, tokenize};

    const TOY: &str = r#"
        LEFT-WALL: Wd+ & {Xp+};
        я: Wd- & S+;
        иду: S- & {MV+} & {[Xx+]};
        по: MV- & J+;
        улице: J-;
        ".": Xp- or Xx-;
        the: D+;
        lazy quick: A+;
        dog: {Wd-} & {D-} & {@A-} & {S+};
    "#;

    fn words(sentence: &str) -> Vec<SentenceWord> {
        let dict = Dictionary::from_text("xx", TOY, None).unwrap();
        build_words(&dict, &tokenize(sentence)).unwrap()
    }

    fn all_linkages(words: &[SentenceWord], nulls: usize) -> Vec<Linkage> {
        let mut search = Search::new(words, nulls, None);
        let n = search.count_linkages().unwrap();
        (0..n).map(|i| search.extract(i).unwrap().unwrap()).collect()
    }

    #[test]
    fn counts_punctuation_ambiguity() {
        let w = words("я иду по улице .");
        let mut search = Search::new(&w, 0, None);
        assert_eq!(search.count_linkages().unwrap(), 2);
    }

    #[test]
    fn extracted_linkages_are_distinct_planar_and_complete() {
        let w = words("я иду по улице .");
        let linkages = all_linkages(&w, 0);
        assert_eq!(linkages.len(), 2);
        assert_ne!(linkages[0], linkages[1]);
        for linkage in &linkages {
            assert_eq!(linkage.num_words(), 6);
            assert_eq!(linkage.num_links(), 5);
            assert!(linkage.is_valid());
            for a in linkage.links() {
                for b in linkage.links() {
                    let crosses = a.left < b.left && b.left < a.right && a.right < b.right;
                    assert!(!crosses, "{:?} crosses {:?}", a, b);
                }
            }
        }
        let labels: Vec<String> = linkages[0].links().iter().map(|l| l.label.clone()).collect();
        assert!(labels.contains(&"Wd".to_string()));
        assert!(labels.contains(&"J".to_string()));
    }

    #[test]
    fn multi_connectors_link_several_words() {
        let w = words("the lazy quick dog");
        let linkages = all_linkages(&w, 0);
        assert_eq!(linkages.len(), 1);
        let a_links = linkages[0].links().iter().filter(|l| l.label == "A").count();
        assert_eq!(a_links, 2);
    }

    #[test]
    fn no_complete_linkage_without_nulls() {
        let w = words("я улице");
        let mut search = Search::new(&w, 0, None);
        assert_eq!(search.count_linkages().unwrap(), 0);
        assert_eq!(search.extract(0).unwrap(), None);
    }

    #[test]
    fn null_words_are_marked() {
        let w = words("я иду улице");
        let linkages = all_linkages(&w, 1);
        assert!(!linkages.is_empty());
        for linkage in &linkages {
            assert_eq!(linkage.null_count(), 1);
            assert_eq!(linkage.word(3).unwrap().text, "[улице]");
        }
    }

    /// Every word links to any number of earlier words, so the number of
    /// linkages grows exponentially with the sentence length.
    fn dense_words(n: usize) -> Vec<SentenceWord> {
        let dict = Dictionary::from_text("xx", "LEFT-WALL: @X+;\na: @X- & {@X+};", None).unwrap();
        build_words(&dict, &tokenize(&vec!["a"; n].join(" "))).unwrap()
    }

    #[test]
    fn expired_deadline_stops_the_count() {
        let w = dense_words(40);
        let mut search = Search::new(&w, 0, Some(Instant::now()));
        assert_eq!(search.count_linkages(), Err(TimerExpired));
    }

    #[test]
    fn huge_counts_saturate_and_still_extract() {
        let w = dense_words(30);
        let mut search = Search::new(&w, 0, None);
        assert_eq!(search.count_linkages().unwrap(), u64::MAX);

        let first = search.extract(0).unwrap().unwrap();
        let last = search.extract(u64::MAX - 1).unwrap().unwrap();
        assert_ne!(first, last);
        for linkage in [&first, &last] {
            assert_eq!(linkage.num_words(), 31);
            assert_eq!(linkage.null_count(), 0);
            assert!(linkage.num_links() >= 30);
        }
    }
}
