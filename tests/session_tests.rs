//! Session behaviour against the bundled English and Russian dictionaries.

mod common;

use link_grammar::{
    CatalogConfig, DictionaryCatalog, ErrorType, OptionValue, ParserSession, SessionState,
};

use common::{session, write_dictionary};

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn russian_short_sentence_has_a_linkage() {
    let mut s = ParserSession::create("ru").unwrap();
    let summary = s.parse("Я иду.").unwrap();
    assert!(summary.num_linkages >= 1);
}

#[test]
fn out_of_bounds_then_underflow() {
    let mut s = ParserSession::create("ru").unwrap();
    s.parse("Я иду по улице.").unwrap();

    let err = s.select_linkage(65536).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::RangeOutOfBounds);

    let err = s.select_linkage(-5).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::RangeUnderflow);
    assert_eq!(s.state(), SessionState::Parsed);
}

#[test]
fn max_linkages_caps_english_parse() {
    let mut s = ParserSession::create("en").unwrap();
    s.set_option("max_linkages", 1).unwrap();
    let summary = s.parse("Quick brown fox jumps over the lazy dog.").unwrap();
    assert!(summary.num_linkages <= 1);
    assert_eq!(summary.num_linkages, 1);
    assert!(summary.num_linkages_found >= 1);
}

#[test]
fn empty_sentence_is_not_an_error() {
    let mut s = ParserSession::create("ru").unwrap();
    let summary = s.parse("").unwrap();
    assert_eq!(summary.num_linkages, 0);
    assert_eq!(summary.num_valid, 0);
    assert_eq!(s.select_linkage(0).unwrap_err().error_type(), ErrorType::RangeOutOfBounds);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn version_and_dictionary_for_every_language() {
    for language in ["en", "ru"] {
        let s = session(language);
        assert!(s.version().unwrap().starts_with("link-grammar"));
        assert_eq!(s.dictionary().unwrap(), language);
    }
}

#[test]
fn unknown_language_fails_creation() {
    let err = ParserSession::create("xx-not-a-language").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::DictionaryNotFound);
}

#[test]
fn every_index_in_range_selects() {
    let mut s = session("ru");
    let summary = s.parse("Я иду по улице.").unwrap();
    assert!(summary.num_linkages >= 2);
    assert!(summary.num_valid <= summary.num_linkages);

    for i in 0..summary.num_linkages as i64 {
        let linkage = s.select_linkage(i).unwrap();
        assert!(linkage.num_links() > 0);
        assert!(!s.diagram().unwrap().is_empty());
        assert!(s.postscript().unwrap().starts_with("%!PS"));
    }
    let n = summary.num_linkages as i64;
    assert_eq!(s.select_linkage(n).unwrap_err().error_type(), ErrorType::RangeOutOfBounds);
    assert_eq!(s.select_linkage(-1).unwrap_err().error_type(), ErrorType::RangeUnderflow);
}

#[test]
fn multibyte_words_survive_into_the_diagram() {
    let mut s = session("ru");
    s.parse("Я иду по улице.").unwrap();
    s.select_linkage(0).unwrap();
    let diagram = s.diagram().unwrap();
    for word in ["я", "иду.v", "по", "улице.n"] {
        assert!(diagram.contains(word), "{} missing from\n{}", word, diagram);
    }
}

#[test]
fn rendering_is_deterministic() {
    let mut s = session("en");
    s.parse("The lazy dog sees the cat.").unwrap();
    s.select_linkage(0).unwrap();
    assert_eq!(s.diagram().unwrap(), s.diagram().unwrap());
    assert_eq!(s.postscript().unwrap(), s.postscript().unwrap());
}

#[test]
fn verbosity_changes_annotation_only() {
    let mut s = session("en");
    s.parse("The dog runs.").unwrap();
    s.select_linkage(0).unwrap();
    let plain = s.diagram().unwrap();

    s.set_option("verbosity", 2).unwrap();
    let detailed = s.diagram().unwrap();
    assert!(detailed.starts_with(&plain));
    assert!(detailed.len() > plain.len());
}

#[test]
fn reparse_discards_selection() {
    let mut s = session("ru");
    s.parse("Я иду по улице.").unwrap();
    s.select_linkage(1).unwrap();
    assert_eq!(s.state(), SessionState::LinkageSelected);

    s.parse("Я иду.").unwrap();
    assert_eq!(s.state(), SessionState::Parsed);
    assert_eq!(s.diagram().unwrap_err().error_type(), ErrorType::State);
}

#[test]
fn release_is_idempotent_and_final() {
    let mut s = session("en");
    s.parse("The dog runs.").unwrap();
    s.select_linkage(0).unwrap();
    s.release();
    s.release();

    assert_eq!(s.state(), SessionState::Closed);
    assert_eq!(s.version().unwrap_err().error_type(), ErrorType::SessionClosed);
    assert_eq!(s.dictionary().unwrap_err().error_type(), ErrorType::SessionClosed);
    assert_eq!(s.parse("The dog runs.").unwrap_err().error_type(), ErrorType::SessionClosed);
    assert_eq!(s.select_linkage(0).unwrap_err().error_type(), ErrorType::SessionClosed);
    assert_eq!(s.diagram().unwrap_err().error_type(), ErrorType::SessionClosed);
    assert_eq!(s.postscript().unwrap_err().error_type(), ErrorType::SessionClosed);
    assert_eq!(
        s.set_option("verbosity", 1).unwrap_err().error_type(),
        ErrorType::SessionClosed
    );
}

#[test]
fn sessions_on_one_language_are_independent() {
    let mut a = ParserSession::create("en").unwrap();
    let mut b = ParserSession::create("en").unwrap();
    a.set_option("max_linkages", 1).unwrap();
    assert_eq!(b.get_option("max_linkages").unwrap(), OptionValue::Int(100));

    b.set_option("verbosity", 3).unwrap();
    assert_eq!(a.get_option("verbosity").unwrap(), OptionValue::Int(0));

    a.parse("The dog runs.").unwrap();
    assert_eq!(b.state(), SessionState::Created);
}

#[test]
fn option_errors_leave_session_usable() {
    let mut s = session("en");
    for (name, value) in [
        ("max_linkages", OptionValue::Int(0)),
        ("max_linkages", OptionValue::Int(-3)),
        ("parse_time_limit_seconds", OptionValue::Int(-1)),
        ("verbosity", OptionValue::Int(-1)),
        ("verbosity", OptionValue::Bool(true)),
        ("display_walls", OptionValue::Int(1)),
    ] {
        let err = s.set_option(name, value).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Configuration, "{} = {}", name, value);
    }
    assert_eq!(s.get_option("max_linkages").unwrap(), OptionValue::Int(100));
    assert!(s.parse("The dog runs.").unwrap().num_linkages > 0);
}

#[test]
fn null_words_when_allowed() {
    let mut s = session("en");
    let summary = s.parse("the dog runs the").unwrap();
    assert_eq!(summary.num_linkages, 0);

    s.set_option("max_null_count", 1).unwrap();
    let summary = s.parse("the dog runs the").unwrap();
    assert!(summary.num_linkages > 0);
    assert_eq!(summary.num_valid, 0);
    assert_eq!(summary.null_count, 1);

    let linkage = s.select_linkage(0).unwrap();
    assert_eq!(linkage.word(4).unwrap().text, "[the]");
    assert!(s.diagram().unwrap().lines().last().unwrap().contains("[the]"));
}

#[test]
fn unknown_words_use_fallback_classes() {
    let mut s = session("en");
    s.parse("Rex runs.").unwrap();
    let linkage = s.select_linkage(0).unwrap();
    assert_eq!(linkage.word(1).unwrap().text, "Rex[!]");
}

#[test]
fn invalid_utf8_is_a_parse_error() {
    let mut s = session("ru");
    let err = s.parse_bytes(&[0xd0, 0x28]).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Parse);
    assert!(s.parse_bytes("Я иду.".as_bytes()).unwrap().num_linkages >= 1);
}

#[test]
fn time_limit_stops_an_exponential_parse() {
    let root = tempfile::tempdir().unwrap();
    write_dictionary(root.path(), "xx", "LEFT-WALL: @X+;\na: @X- & {@X+};\n");
    let catalog = DictionaryCatalog::new(CatalogConfig::with_search_root(root.path()).unwrap());
    let mut s = ParserSession::create_in(&catalog, "xx").unwrap();
    s.set_option("parse_time_limit_seconds", 1).unwrap();

    let summary = s.parse(&vec!["a"; 150].join(" ")).unwrap();
    assert!(summary.timer_expired);
    assert_eq!(summary.num_linkages, 0);
    assert_eq!(s.state(), SessionState::Parsed);
    assert_eq!(s.select_linkage(0).unwrap_err().error_type(), ErrorType::RangeOutOfBounds);
}

#[test]
fn ellipsis_is_one_punctuation_token() {
    let mut s = session("en");
    assert!(s.parse("The dog runs...").unwrap().num_linkages > 0);
    let linkage = s.select_linkage(0).unwrap();
    assert_eq!(linkage.num_words(), 5);
    assert_eq!(linkage.word(4).unwrap().text, "...");
}
