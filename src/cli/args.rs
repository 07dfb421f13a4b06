//! Defines the command-line arguments and subcommands for the link-grammar CLI.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "link-grammar",
    version,
    about = "Parse sentences with a link grammar dictionary and draw their linkages."
)]
pub struct LinkGrammarArgs {
    /// Directory holding <language>/4.0.dict dictionaries.
    ///
    /// Defaults to $LINK_GRAMMAR_DATA, then the bundled data.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Dictionary language code.
    #[arg(short, long, global = true, default_value = "en")]
    pub language: String,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the engine version and the dictionary language.
    Info,
    /// Parse a sentence and draw one of its linkages.
    Parse(ParseArgs),
    /// List the dictionaries found under the data directory.
    Languages,
}

#[derive(Debug, clap::Args)]
pub struct ParseArgs {
    /// The sentence to parse.
    #[arg(required = true)]
    pub sentence: String,

    /// Index of the linkage to draw.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub linkage: i64,

    /// Upper bound on the linkages kept.
    #[arg(long)]
    pub max_linkages: Option<usize>,

    /// Parse time limit in seconds (0 = none).
    #[arg(long)]
    pub time_limit: Option<u64>,

    /// Allow up to N unlinked words when no complete linkage exists.
    #[arg(long)]
    pub max_null_count: Option<usize>,

    /// Hide LEFT-WALL/RIGHT-WALL in diagrams.
    #[arg(long)]
    pub no_walls: bool,

    /// Diagram detail level (link table at 1, disjuncts at 2).
    #[arg(long)]
    pub diagram_verbosity: Option<u32>,

    /// Options file (YAML, or JSON with a .json extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the linkage as PostScript to this file.
    #[arg(long)]
    pub postscript: Option<PathBuf>,

    /// Print the parse summary as JSON instead of a diagram.
    #[arg(long)]
    pub json: bool,
}
