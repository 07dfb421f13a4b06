//! Dictionary catalog: search roots, sharing and malformed dictionaries.

mod common;

use std::sync::Arc;

use link_grammar::{
    CatalogConfig, DictionaryCatalog, ErrorType, LinkGrammarError, ParserSession, SharePolicy,
};
use miette::Diagnostic;

use common::{bundled_catalog, write_dictionary};

#[test]
fn bundled_dictionaries_load_with_metadata() {
    let catalog = bundled_catalog();
    let en = catalog.load("en").unwrap();
    assert_eq!(en.language(), "en");
    assert!(en.version().is_some());
    assert!(en.contains("fox"));

    let ru = catalog.load("ru").unwrap();
    assert!(ru.contains("улице"));
    assert!(!ru.regex_classes().is_empty());
}

#[test]
fn languages_are_listed_sorted() {
    let root = tempfile::tempdir().unwrap();
    write_dictionary(root.path(), "zz", "LEFT-WALL: Wd+;\nb: Wd-;");
    write_dictionary(root.path(), "aa", "LEFT-WALL: Wd+;\na: Wd-;");
    std::fs::create_dir(root.path().join("empty")).unwrap();

    let catalog = DictionaryCatalog::new(CatalogConfig::with_search_root(root.path()).unwrap());
    assert_eq!(catalog.available_languages().unwrap(), vec!["aa", "zz"]);
}

#[test]
fn shared_sessions_share_one_dictionary() {
    let catalog = bundled_catalog();
    assert_eq!(catalog.share_policy(), SharePolicy::Shared);
    let a = ParserSession::create_in(&catalog, "en").unwrap();
    let b = ParserSession::create_in(&catalog, "en").unwrap();
    assert!(Arc::ptr_eq(a.dictionary_handle().unwrap(), b.dictionary_handle().unwrap()));
}

#[test]
fn malformed_dictionary_reports_location() {
    let root = tempfile::tempdir().unwrap();
    write_dictionary(root.path(), "xx", "LEFT-WALL: Wd+;\ndog: Wd- &;\n");
    let catalog = DictionaryCatalog::new(CatalogConfig::with_search_root(root.path()).unwrap());

    let err = ParserSession::create_in(&catalog, "xx").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::DictionaryNotFound);
    assert!(err.labels().is_some());
    assert!(err.source_code().is_some());
    assert!(err.code().unwrap().to_string().starts_with("link_grammar::"));
}

#[test]
fn search_root_change_affects_later_loads_only() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write_dictionary(first.path(), "xx", "LEFT-WALL: Wd+;\nfirst: Wd-;");
    write_dictionary(second.path(), "xx", "LEFT-WALL: Wd+;\nsecond: Wd-;");

    let catalog = DictionaryCatalog::new(CatalogConfig::with_search_root(first.path()).unwrap());
    let mut before = ParserSession::create_in(&catalog, "xx").unwrap();
    catalog.set_search_root(second.path()).unwrap();
    let mut after = ParserSession::create_in(&catalog, "xx").unwrap();

    assert!(before.parse("first").unwrap().num_linkages > 0);
    assert!(after.parse("first").unwrap().num_linkages > 0);
}

#[test]
fn private_policy_reloads() {
    let root = tempfile::tempdir().unwrap();
    write_dictionary(root.path(), "xx", "LEFT-WALL: Wd+;\nold: Wd-;");
    let config = CatalogConfig::with_search_root(root.path())
        .unwrap()
        .share_policy(SharePolicy::Private);
    let catalog = DictionaryCatalog::new(config);

    let before = ParserSession::create_in(&catalog, "xx").unwrap();
    write_dictionary(root.path(), "xx", "LEFT-WALL: Wd+;\nnew: Wd-;");
    let after = ParserSession::create_in(&catalog, "xx").unwrap();

    assert!(before.dictionary_handle().unwrap().contains("old"));
    assert!(after.dictionary_handle().unwrap().contains("new"));
}

#[test]
fn bad_search_root_is_a_configuration_error() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err: LinkGrammarError = CatalogConfig::with_search_root(file.path()).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Configuration);
    assert!(err.help().is_some());
}
