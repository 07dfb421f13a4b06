//! Handles all user-facing output for the CLI.
//!
//! Headings are coloured when stdout is a terminal; errors go to stderr through
//! miette's report handler.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::{error::LinkGrammarError, session::ParseSummary};

fn stdout() -> StandardStream {
    let choice = if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Prints `label: value` with a coloured label.
pub fn print_field(label: &str, value: &str) {
    let mut out = stdout();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = write!(out, "{}:", label);
    let _ = out.reset();
    let _ = writeln!(out, " {}", value);
}

/// Prints the counts of a parse.
pub fn print_summary(summary: &ParseSummary) {
    print_field("linkages", &summary.num_linkages.to_string());
    print_field("valid", &summary.num_valid.to_string());
    if summary.num_linkages_found > summary.num_linkages as u64 {
        let found = match summary.num_linkages_found {
            u64::MAX => format!(">= {}", u64::MAX),
            n => n.to_string(),
        };
        print_field("found", &found);
    }
    if summary.null_count > 0 {
        print_field("null words", &summary.null_count.to_string());
    }
    if summary.timer_expired {
        let mut out = stdout();
        let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = writeln!(out, "parse time limit reached");
        let _ = out.reset();
    }
}

pub fn print_diagram(index: i64, diagram: &str) {
    let mut out = stdout();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(out, "--- linkage {} ---", index);
    let _ = out.reset();
    let _ = write!(out, "{}", diagram);
}

pub fn print_list(items: &[String]) {
    if items.is_empty() {
        println!("  No dictionaries found.");
        return;
    }
    for item in items {
        println!("  {}", item);
    }
}

/// Renders an error with its diagnostic context on stderr.
pub fn print_error(error: LinkGrammarError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
