//! Rendering of linkages: text diagrams and PostScript.

use crate::{linkage::Linkage, options::ParseOptions};

pub mod diagram;
pub mod layout;
pub mod postscript;

pub use layout::Layout;

/// Text diagram of `linkage`, with link and disjunct tables as `verbosity` asks.
pub fn diagram(linkage: &Linkage, options: &ParseOptions) -> String {
    diagram::render(linkage, options)
}

/// Encapsulated PostScript document drawing `linkage`.
pub fn postscript(linkage: &Linkage, options: &ParseOptions) -> String {
    postscript::render(linkage, options)
}
