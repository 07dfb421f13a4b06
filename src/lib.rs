//! Link Grammar: a session-oriented natural-language sentence parser.
//!
//! ```no_run
//! use link_grammar::ParserSession;
//!
//! let mut session = ParserSession::create("en")?;
//! session.set_option("max_linkages", 10)?;
//! let summary = session.parse("The lazy dog jumps.")?;
//! if summary.num_linkages > 0 {
//!     session.select_linkage(0)?;
//!     println!("{}", session.diagram()?);
//! }
//! # Ok::<(), link_grammar::LinkGrammarError>(())
//! ```

pub use crate::catalog::{CatalogConfig, DictionaryCatalog, SharePolicy};
pub use crate::engine::{LinkEngine, ParseEngine, ParseOutcome};
pub use crate::error::{ErrorType, LinkGrammarError, Result};
pub use crate::linkage::{Link, Linkage, LinkageSet, LinkageWord};
pub use crate::options::{OptionName, OptionValue, ParseOptions};
pub use crate::session::{ParseSummary, ParserSession, SessionState};

pub mod catalog;
pub mod cli;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod linkage;
pub mod logging;
pub mod options;
pub mod render;
pub mod session;
