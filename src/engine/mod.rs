//! The parse engine: turns a sentence into a ranked set of linkages.
//!
//! [`ParseEngine`] is the seam between a session and the parsing algorithm.
//! [`LinkEngine`] is the built-in implementation: it tokenizes the sentence,
//! looks every token up in the dictionary, counts the planar linkages, and
//! extracts up to `max_linkages` of them.

use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use rand::{seq::index, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, info, warn};

use crate::{
    dictionary::Dictionary,
    error::{LinkGrammarError, Result},
    linkage::Linkage,
    options::ParseOptions,
};

pub mod search;
pub mod tokenize;

use search::{Search, TimerExpired};

/// Seed used when `repeatable_rand` is on.
const REPEATABLE_SEED: u64 = 0x6c69_6e6b;

/// What an engine produced for one sentence.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Extracted linkages, best first
    pub linkages: Vec<Linkage>,
    /// Linkages that exist at `null_count`, before sampling. Saturates at
    /// `u64::MAX`.
    pub num_found: u64,
    /// Null words in every linkage
    pub null_count: usize,
    pub timer_expired: bool,
}

/// A sentence parser over a loaded dictionary.
pub trait ParseEngine: Send + Sync + Debug {
    /// Identifier of the engine, reported by `ParserSession::version`.
    fn version(&self) -> String;

    fn parse(
        &self,
        dict: &Dictionary,
        sentence: &str,
        options: &ParseOptions,
    ) -> Result<ParseOutcome>;
}

// ============================================================================
// LINK ENGINE
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct LinkEngine;

impl ParseEngine for LinkEngine {
    fn version(&self) -> String {
        format!("link-grammar-{}", env!("CARGO_PKG_VERSION"))
    }

    fn parse(
        &self,
        dict: &Dictionary,
        sentence: &str,
        options: &ParseOptions,
    ) -> Result<ParseOutcome> {
        let tokens = tokenize::tokenize(sentence);
        if tokens.is_empty() {
            return Ok(ParseOutcome::default());
        }
        let words = tokenize::build_words(dict, &tokens)?;
        debug!(tokens = tokens.len(), words = words.len(), "sentence prepared");

        let deadline = match options.parse_time_limit_seconds() {
            0 => None,
            secs => Instant::now().checked_add(Duration::from_secs(secs)),
        };

        for nulls in 0..=options.max_null_count().min(tokens.len()) {
            let mut search = Search::new(&words, nulls, deadline);
            let found = match search.count_linkages() {
                Ok(found) => found,
                Err(TimerExpired) => return Ok(expired(nulls)),
            };
            debug!(nulls, found, "counted linkages");
            if found == 0 {
                continue;
            }

            let picks = pick_indices(found, options.max_linkages(), options.repeatable_rand())?;
            let mut linkages = Vec::with_capacity(picks.len());
            for i in picks {
                match search.extract(i) {
                    Ok(Some(linkage)) => linkages.push(linkage),
                    Ok(None) => {
                        return Err(LinkGrammarError::parse(format!(
                            "linkage {} of {} could not be extracted",
                            i, found
                        )))
                    }
                    Err(TimerExpired) => return Ok(expired(nulls)),
                }
            }
            linkages.sort_by_key(Linkage::rank_key);

            info!(
                sentence,
                found,
                kept = linkages.len(),
                null_count = nulls,
                "sentence parsed"
            );
            return Ok(ParseOutcome {
                linkages,
                num_found: found,
                null_count: nulls,
                timer_expired: false,
            });
        }

        info!(sentence, "no linkage found");
        Ok(ParseOutcome::default())
    }
}

fn expired(nulls: usize) -> ParseOutcome {
    warn!(null_count = nulls, "parse time limit reached");
    ParseOutcome {
        null_count: nulls,
        timer_expired: true,
        ..ParseOutcome::default()
    }
}

/// Indices of the linkages to extract: all of them when they fit, otherwise a
/// uniform random sample of `max` in increasing order.
fn pick_indices(found: u64, max: usize, repeatable: bool) -> Result<Vec<u64>> {
    let max_u64 = u64::try_from(max).unwrap_or(u64::MAX);
    if found <= max_u64 {
        return Ok((0..found).collect());
    }
    // `max` is below `found` here, and the sample is drawn over at most
    // usize::MAX positions.
    let population = usize::try_from(found).map_err(|_| {
        LinkGrammarError::parse(format!("{} linkages are too many to sample from", found))
    })?;
    let mut rng = if repeatable {
        Xoshiro256StarStar::seed_from_u64(REPEATABLE_SEED)
    } else {
        Xoshiro256StarStar::from_entropy()
    };
    let mut picks: Vec<u64> = index::sample(&mut rng, population, max)
        .into_iter()
        .map(|i| i as u64)
        .collect();
    picks.sort_unstable();
    debug!(found, kept = max, "sampled linkages");
    Ok(picks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOY: &str = r#"
        LEFT-WALL: Wd+ & {Xp+};
        я: Wd- & S+;
        иду.v: S- & {MV+} & {[Xx+]};
        по: MV- & J+;
        улице.n: J-;
        ".": Xp- or [Xx-];
    "#;

    fn dict() -> Dictionary {
        Dictionary::from_text("xx", TOY, None).unwrap()
    }

    #[test]
    fn version_names_the_engine() {
        assert!(LinkEngine.version().starts_with("link-grammar-"));
    }

    #[test]
    fn ranks_cheaper_linkages_first() {
        let outcome = LinkEngine
            .parse(&dict(), "Я иду по улице.", &ParseOptions::new())
            .unwrap();
        assert_eq!(outcome.num_found, 2);
        assert_eq!(outcome.linkages.len(), 2);
        assert!(outcome.linkages[0].disjunct_cost() <= outcome.linkages[1].disjunct_cost());
        assert_eq!(outcome.linkages[1].disjunct_cost(), 2);
        assert_eq!(outcome.linkages[0].word(2).unwrap().text, "иду.v");
    }

    #[test]
    fn caps_at_max_linkages() {
        let mut options = ParseOptions::new();
        options.set_max_linkages(1).unwrap();
        let outcome = LinkEngine.parse(&dict(), "Я иду по улице.", &options).unwrap();
        assert_eq!(outcome.num_found, 2);
        assert_eq!(outcome.linkages.len(), 1);
    }

    #[test]
    fn empty_sentence_has_no_linkages() {
        let outcome = LinkEngine.parse(&dict(), "   ", &ParseOptions::new()).unwrap();
        assert!(outcome.linkages.is_empty());
        assert_eq!(outcome.num_found, 0);
    }

    #[test]
    fn retries_with_null_words() {
        let mut options = ParseOptions::new();
        options.set_max_null_count(2);
        let outcome = LinkEngine.parse(&dict(), "я иду улице", &options).unwrap();
        assert_eq!(outcome.null_count, 1);
        assert!(!outcome.linkages.is_empty());
        assert!(!outcome.linkages[0].is_valid());

        options.set_max_null_count(0);
        let outcome = LinkEngine.parse(&dict(), "я иду улице", &options).unwrap();
        assert!(outcome.linkages.is_empty());
    }

    #[test]
    fn sampling_is_repeatable() {
        let a = pick_indices(1000, 10, true).unwrap();
        let b = pick_indices(1000, 10, true).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(pick_indices(3, 10, true).unwrap(), vec![0, 1, 2]);
    }
}
