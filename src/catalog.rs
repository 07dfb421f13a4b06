//! Dictionary catalog: resolves language codes to loaded dictionaries.
//!
//! The search root is an explicit [`CatalogConfig`] value. A process-wide catalog
//! is available through [`DictionaryCatalog::global`]; its root may be changed
//! with [`DictionaryCatalog::set_search_root`], which only affects dictionaries
//! that have not been loaded yet.

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, RwLock},
};

use once_cell::sync::Lazy;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{
    dictionary::{Dictionary, DICT_FILE},
    error::{LinkGrammarError, Result},
};

/// Environment variable overriding the default search root.
pub const DATA_DIR_ENV: &str = "LINK_GRAMMAR_DATA";

/// Dictionaries bundled with the crate.
pub const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

static GLOBAL: Lazy<DictionaryCatalog> = Lazy::new(DictionaryCatalog::default);

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Whether sessions over the same language share one loaded dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SharePolicy {
    /// Load once per language and share it read-only between sessions.
    #[default]
    Shared,
    /// Load a fresh dictionary for every request.
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub search_root: PathBuf,
    pub share_policy: SharePolicy,
}

impl CatalogConfig {
    /// Config rooted at `search_root`, validated to be a readable directory.
    pub fn with_search_root(search_root: impl Into<PathBuf>) -> Result<Self> {
        let search_root = search_root.into();
        check_search_root(&search_root)?;
        Ok(Self {
            search_root,
            share_policy: SharePolicy::default(),
        })
    }

    pub fn share_policy(mut self, policy: SharePolicy) -> Self {
        self.share_policy = policy;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search_root: default_search_root(),
            share_policy: SharePolicy::default(),
        }
    }
}

/// `$LINK_GRAMMAR_DATA` if set, otherwise the bundled `data/` directory.
pub fn default_search_root() -> PathBuf {
    match env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(BUNDLED_DATA_DIR),
    }
}

fn check_search_root(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(LinkGrammarError::configuration_with_help(
            format!("search root {} does not exist or is not a directory", path.display()),
            format!("set it to a directory containing <language>/{}", DICT_FILE),
        ));
    }
    fs::read_dir(path).map_err(|e| {
        LinkGrammarError::configuration(format!(
            "search root {} is not readable: {}",
            path.display(),
            e
        ))
    })?;
    Ok(())
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug)]
pub struct DictionaryCatalog {
    search_root: RwLock<PathBuf>,
    share_policy: SharePolicy,
    loaded: Mutex<HashMap<String, Arc<Dictionary>>>,
}

impl Default for DictionaryCatalog {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

impl DictionaryCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            search_root: RwLock::new(config.search_root),
            share_policy: config.share_policy,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide catalog used by [`crate::ParserSession::create`].
    pub fn global() -> &'static DictionaryCatalog {
        &GLOBAL
    }

    pub fn search_root(&self) -> PathBuf {
        match self.search_root.read() {
            Ok(root) => root.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn share_policy(&self) -> SharePolicy {
        self.share_policy
    }

    /// Change where dictionaries not yet loaded are looked up.
    pub fn set_search_root(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        check_search_root(path)?;
        let mut root = match self.search_root.write() {
            Ok(root) => root,
            Err(poisoned) => poisoned.into_inner(),
        };
        debug!(root = %path.display(), "search root changed");
        *root = path.to_path_buf();
        Ok(())
    }

    /// Resolve and load the dictionary for `language`.
    pub fn load(&self, language: &str) -> Result<Arc<Dictionary>> {
        if self.share_policy == SharePolicy::Private {
            return self.load_fresh(language);
        }

        let mut loaded = match self.loaded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(dict) = loaded.get(language) {
            debug!(language, "dictionary cache hit");
            return Ok(Arc::clone(dict));
        }
        let dict = self.load_fresh(language)?;
        loaded.insert(language.to_string(), Arc::clone(&dict));
        Ok(dict)
    }

    fn load_fresh(&self, language: &str) -> Result<Arc<Dictionary>> {
        let root = self.search_root();
        let dict = Dictionary::load(language, &root)?;
        info!(
            language,
            path = %dict.path().display(),
            words = dict.num_words(),
            "dictionary loaded"
        );
        Ok(Arc::new(dict))
    }

    /// Whether `language` is already loaded and cached.
    pub fn is_loaded(&self, language: &str) -> bool {
        match self.loaded.lock() {
            Ok(guard) => guard.contains_key(language),
            Err(poisoned) => poisoned.into_inner().contains_key(language),
        }
    }

    /// Language codes with a dictionary under the current search root, sorted.
    pub fn available_languages(&self) -> Result<Vec<String>> {
        let root = self.search_root();
        let mut languages = Vec::new();
        for entry in WalkDir::new(&root).min_depth(2).max_depth(2) {
            let entry = entry.map_err(|e| {
                LinkGrammarError::configuration(format!(
                    "failed to walk {}: {}",
                    root.display(),
                    e
                ))
            })?;
            if !entry.file_type().is_file() || entry.file_name() != DICT_FILE {
                continue;
            }
            if let Some(lang) = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
            {
                languages.push(lang.to_string());
            }
        }
        languages.sort();
        Ok(languages)
    }
}
