//! Prefix-based command line classifier for check-service.
//!
//! Splits raw tokens into positional arguments and named options. The
//! classifier knows nothing about which options the tool accepts; that is
//! decided afterwards by the orchestrator.
//!
//! A token is an option marker when it is at least two characters long and
//! starts with `-` or `/`. A marker followed by a non-marker consumes that
//! token as its value; otherwise it is a flag with an empty value.

use std::ffi::OsString;

use thiserror::Error;
use tracing::debug;

/// How option names are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    /// `-D` and `-d` name the same option (default)
    #[default]
    Insensitive,
    /// Names must match exactly
    Sensitive,
}

impl CaseSensitivity {
    /// Compare two option names under this policy.
    ///
    /// Insensitive comparison uses Unicode lowercase folding, which does not
    /// depend on the current locale.
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => a == b || a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// What happens when an option name repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Later occurrences are ignored (default)
    #[default]
    KeepFirst,
    /// Later occurrences overwrite the earlier value
    KeepLast,
    /// A repeated option makes parsing fail
    Error,
}

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub case: CaseSensitivity,
    pub duplicates: DuplicatePolicy,
}

impl ParseOptions {
    pub fn case_sensitive(mut self) -> Self {
        self.case = CaseSensitivity::Sensitive;
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }
}

/// Classification error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Only raised under `DuplicatePolicy::Error`
    #[error("Option '{name}' specified more than once")]
    DuplicateOption { name: String },
}

/// Result of classifying a token sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArguments {
    positionals: Vec<String>,
    options: Vec<(String, String)>,
    case: CaseSensitivity,
}

impl ParsedArguments {
    /// Positional arguments in encounter order
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Options in order of first appearance, prefix stripped
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Look up an option value. Flags yield `Some("")`.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(existing, _)| self.case.matches(existing, name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.option(name).is_some()
    }

    /// Comparison policy the options were collected under
    pub fn case(&self) -> CaseSensitivity {
        self.case
    }
}

/// Raw process arguments as tokens; invalid UTF-8 is replaced, not fatal
pub fn lossy_tokens<I>(args: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter().map(|arg| arg.to_string_lossy().into_owned())
}

/// Returns true if the token introduces an option or flag
pub fn is_option_marker(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some('-') | Some('/') => chars.next().is_some(),
        _ => false,
    }
}

/// Command line classifier
#[derive(Debug, Clone, Default)]
pub struct ArgumentParser {
    options: ParseOptions,
}

impl ArgumentParser {
    /// Create a parser with default options (case-insensitive, keep-first)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom options
    pub fn with_options(options: ParseOptions) -> Self {
        ArgumentParser { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Classify a token sequence
    pub fn parse<I, S>(&self, tokens: I) -> Result<ParsedArguments, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positionals = Vec::new();
        let mut options = Vec::new();
        let mut tokens = tokens.into_iter().map(Into::into).peekable();

        while let Some(token) = tokens.next() {
            if !is_option_marker(&token) {
                positionals.push(token);
                continue;
            }

            // Both prefixes are single-byte ASCII
            let name = token[1..].to_string();
            let value = tokens
                .next_if(|next| !is_option_marker(next))
                .unwrap_or_default();

            self.insert(&mut options, name, value)?;
        }

        Ok(ParsedArguments {
            positionals,
            options,
            case: self.options.case,
        })
    }

    fn insert(
        &self,
        options: &mut Vec<(String, String)>,
        name: String,
        value: String,
    ) -> Result<(), ParseError> {
        let existing = options
            .iter()
            .position(|(existing, _)| self.options.case.matches(existing, &name));

        match existing {
            None => options.push((name, value)),
            Some(index) => match self.options.duplicates {
                DuplicatePolicy::KeepFirst => {
                    debug!(option = %name, "ignoring repeated option");
                }
                DuplicatePolicy::KeepLast => options[index].1 = value,
                DuplicatePolicy::Error => return Err(ParseError::DuplicateOption { name }),
            },
        }

        Ok(())
    }
}
