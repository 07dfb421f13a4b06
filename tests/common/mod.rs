//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::{fs, path::Path};

use link_grammar::{catalog::BUNDLED_DATA_DIR, CatalogConfig, DictionaryCatalog, ParserSession};

/// A catalog over the dictionaries shipped in `data/`.
pub fn bundled_catalog() -> DictionaryCatalog {
    DictionaryCatalog::new(CatalogConfig::with_search_root(BUNDLED_DATA_DIR).unwrap())
}

pub fn session(language: &str) -> ParserSession {
    ParserSession::create_in(&bundled_catalog(), language).unwrap()
}

/// Write `<root>/<language>/4.0.dict`.
pub fn write_dictionary(root: &Path, language: &str, text: &str) {
    let dir = root.join(language);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("4.0.dict"), text).unwrap();
}
