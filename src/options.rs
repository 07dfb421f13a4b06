//! Parse options: a validated, named configuration structure.
//!
//! Options are changed through typed setters or through the name/value pair API
//! (`set_option("max_linkages", 1)`). Every change is validated; an invalid value
//! leaves the options untouched and returns a `ConfigurationError`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{LinkGrammarError, Result};

pub const DEFAULT_MAX_LINKAGES: usize = 100;

// ============================================================================
// OPTION NAMES AND VALUES
// ============================================================================

/// The options a session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    MaxLinkages,
    ParseTimeLimitSeconds,
    Verbosity,
    MaxNullCount,
    DisplayWalls,
    RepeatableRand,
}

impl OptionName {
    pub const ALL: [OptionName; 6] = [
        OptionName::MaxLinkages,
        OptionName::ParseTimeLimitSeconds,
        OptionName::Verbosity,
        OptionName::MaxNullCount,
        OptionName::DisplayWalls,
        OptionName::RepeatableRand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionName::MaxLinkages => "max_linkages",
            OptionName::ParseTimeLimitSeconds => "parse_time_limit_seconds",
            OptionName::Verbosity => "verbosity",
            OptionName::MaxNullCount => "max_null_count",
            OptionName::DisplayWalls => "display_walls",
            OptionName::RepeatableRand => "repeatable_rand",
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = LinkGrammarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "max_linkages" | "linkage_limit" => Ok(OptionName::MaxLinkages),
            "parse_time_limit_seconds" | "parse_time" | "max_parse_time" => {
                Ok(OptionName::ParseTimeLimitSeconds)
            }
            "verbosity" => Ok(OptionName::Verbosity),
            "max_null_count" => Ok(OptionName::MaxNullCount),
            "display_walls" => Ok(OptionName::DisplayWalls),
            "repeatable_rand" => Ok(OptionName::RepeatableRand),
            other => Err(LinkGrammarError::configuration_with_help(
                format!("unknown option '{}'", other),
                format!(
                    "known options: {}",
                    OptionName::ALL
                        .iter()
                        .map(OptionName::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }
}

/// A dynamically typed option value, as accepted by `set_option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    Int(i64),
    Bool(bool),
}

impl OptionValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Int(_) => "integer",
            OptionValue::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Int(n as i64)
    }
}

impl From<usize> for OptionValue {
    fn from(n: usize) -> Self {
        OptionValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<u64> for OptionValue {
    fn from(n: u64) -> Self {
        OptionValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

// ============================================================================
// PARSE OPTIONS
// ============================================================================

/// Options applied to every parse issued after they are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    max_linkages: usize,
    #[serde(alias = "parse_time")]
    parse_time_limit_seconds: u64,
    verbosity: u32,
    max_null_count: usize,
    display_walls: bool,
    repeatable_rand: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_linkages: DEFAULT_MAX_LINKAGES,
            parse_time_limit_seconds: 0,
            verbosity: 0,
            max_null_count: 0,
            display_walls: true,
            repeatable_rand: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let options: ParseOptions = serde_yaml::from_str(text).map_err(|e| {
            LinkGrammarError::configuration(format!("invalid options document: {}", e))
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON document. Missing keys keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let options: ParseOptions = serde_json::from_str(text).map_err(|e| {
            LinkGrammarError::configuration(format!("invalid options document: {}", e))
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Re-checks the invariants that deserialisation cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.max_linkages == 0 {
            return Err(out_of_range(OptionName::MaxLinkages, 0, "> 0"));
        }
        Ok(())
    }

    pub fn max_linkages(&self) -> usize {
        self.max_linkages
    }

    pub fn set_max_linkages(&mut self, value: usize) -> Result<()> {
        if value == 0 {
            return Err(out_of_range(OptionName::MaxLinkages, 0, "> 0"));
        }
        self.max_linkages = value;
        Ok(())
    }

    pub fn parse_time_limit_seconds(&self) -> u64 {
        self.parse_time_limit_seconds
    }

    /// `0` disables the session-side limit.
    pub fn set_parse_time_limit_seconds(&mut self, value: u64) {
        self.parse_time_limit_seconds = value;
    }

    pub fn verbosity(&self) -> u32 {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, value: u32) {
        self.verbosity = value;
    }

    pub fn max_null_count(&self) -> usize {
        self.max_null_count
    }

    pub fn set_max_null_count(&mut self, value: usize) {
        self.max_null_count = value;
    }

    pub fn display_walls(&self) -> bool {
        self.display_walls
    }

    pub fn set_display_walls(&mut self, value: bool) {
        self.display_walls = value;
    }

    pub fn repeatable_rand(&self) -> bool {
        self.repeatable_rand
    }

    pub fn set_repeatable_rand(&mut self, value: bool) {
        self.repeatable_rand = value;
    }

    pub fn get(&self, name: OptionName) -> OptionValue {
        match name {
            OptionName::MaxLinkages => OptionValue::from(self.max_linkages),
            OptionName::ParseTimeLimitSeconds => OptionValue::from(self.parse_time_limit_seconds),
            OptionName::Verbosity => OptionValue::Int(i64::from(self.verbosity)),
            OptionName::MaxNullCount => OptionValue::from(self.max_null_count),
            OptionName::DisplayWalls => OptionValue::Bool(self.display_walls),
            OptionName::RepeatableRand => OptionValue::Bool(self.repeatable_rand),
        }
    }

    /// Validate `value` for `name` and store it.
    pub fn set(&mut self, name: OptionName, value: OptionValue) -> Result<()> {
        match name {
            OptionName::MaxLinkages => {
                let n = expect_int(name, value)?;
                if n <= 0 {
                    return Err(out_of_range(name, n, "> 0"));
                }
                self.set_max_linkages(to_usize(name, n)?)
            }
            OptionName::ParseTimeLimitSeconds => {
                let n = non_negative(name, value)?;
                self.parse_time_limit_seconds = n as u64;
                Ok(())
            }
            OptionName::Verbosity => {
                let n = non_negative(name, value)?;
                self.verbosity =
                    u32::try_from(n).map_err(|_| out_of_range(name, n, "<= u32::MAX"))?;
                Ok(())
            }
            OptionName::MaxNullCount => {
                let n = non_negative(name, value)?;
                self.max_null_count = to_usize(name, n)?;
                Ok(())
            }
            OptionName::DisplayWalls => {
                self.display_walls = expect_bool(name, value)?;
                Ok(())
            }
            OptionName::RepeatableRand => {
                self.repeatable_rand = expect_bool(name, value)?;
                Ok(())
            }
        }
    }
}

// ============================================================================
// VALIDATION HELPERS
// ============================================================================

fn out_of_range(name: OptionName, value: i64, expected: &str) -> LinkGrammarError {
    LinkGrammarError::configuration(format!(
        "option '{}' must be {}, got {}",
        name, expected, value
    ))
}

fn expect_int(name: OptionName, value: OptionValue) -> Result<i64> {
    match value {
        OptionValue::Int(n) => Ok(n),
        other => Err(LinkGrammarError::configuration(format!(
            "option '{}' expects an integer, got {} {}",
            name,
            other.type_name(),
            other
        ))),
    }
}

fn expect_bool(name: OptionName, value: OptionValue) -> Result<bool> {
    match value {
        OptionValue::Bool(b) => Ok(b),
        other => Err(LinkGrammarError::configuration(format!(
            "option '{}' expects a boolean, got {} {}",
            name,
            other.type_name(),
            other
        ))),
    }
}

fn non_negative(name: OptionName, value: OptionValue) -> Result<i64> {
    let n = expect_int(name, value)?;
    if n < 0 {
        return Err(out_of_range(name, n, ">= 0"));
    }
    Ok(n)
}

fn to_usize(name: OptionName, n: i64) -> Result<usize> {
    usize::try_from(n).map_err(|_| out_of_range(name, n, "addressable"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    #[test]
    fn defaults() {
        let opts = ParseOptions::default();
        assert_eq!(opts.max_linkages(), DEFAULT_MAX_LINKAGES);
        assert_eq!(opts.parse_time_limit_seconds(), 0);
        assert_eq!(opts.verbosity(), 0);
        assert!(opts.display_walls());
    }

    #[test]
    fn set_and_get_by_name() {
        let mut opts = ParseOptions::default();
        opts.set("max_linkages".parse().unwrap(), 1.into()).unwrap();
        opts.set("parse_time".parse().unwrap(), 10.into()).unwrap();
        opts.set(OptionName::Verbosity, 1.into()).unwrap();
        assert_eq!(opts.get(OptionName::MaxLinkages), OptionValue::Int(1));
        assert_eq!(opts.get(OptionName::ParseTimeLimitSeconds), OptionValue::Int(10));
        assert_eq!(opts.get(OptionName::Verbosity), OptionValue::Int(1));
    }

    #[test]
    fn rejects_out_of_range_values_and_keeps_old_ones() {
        let mut opts = ParseOptions::default();
        for (name, value) in [
            (OptionName::MaxLinkages, 0),
            (OptionName::MaxLinkages, -3),
            (OptionName::ParseTimeLimitSeconds, -1),
            (OptionName::Verbosity, -1),
            (OptionName::MaxNullCount, -2),
        ] {
            let err = opts.set(name, value.into()).unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Configuration);
        }
        assert_eq!(opts, ParseOptions::default());
    }

    #[test]
    fn rejects_wrong_types() {
        let mut opts = ParseOptions::default();
        let err = opts.set(OptionName::Verbosity, true.into()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Configuration);
        let err = opts.set(OptionName::DisplayWalls, 1.into()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Configuration);
    }

    #[test]
    fn unknown_names_are_configuration_errors() {
        let err = "colour".parse::<OptionName>().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Configuration);
    }

    #[test]
    fn loads_from_yaml_and_json() {
        let opts = ParseOptions::from_yaml_str("max_linkages: 5\nparse_time: 3\n").unwrap();
        assert_eq!(opts.max_linkages(), 5);
        assert_eq!(opts.parse_time_limit_seconds(), 3);
        assert_eq!(opts.verbosity(), 0);

        let json = r#"{"verbosity": 2, "display_walls": false}"#;
        let opts = ParseOptions::from_json_str(json).unwrap();
        assert_eq!(opts.verbosity(), 2);
        assert!(!opts.display_walls());
    }

    #[test]
    fn documents_are_validated() {
        assert!(ParseOptions::from_yaml_str("max_linkages: 0\n").is_err());
        assert!(ParseOptions::from_yaml_str("verbosity: -1\n").is_err());
        assert!(ParseOptions::from_json_str(r#"{"colour": true}"#).is_err());
    }
}
