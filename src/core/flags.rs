//! Compiler/linker flag tokens and the option set they accumulate into.
//!
//! The package-configuration tool reports flags as whitespace separated
//! tokens such as `-I/usr/include/king -L/usr/lib -lking`. The first two
//! characters select a category, the remainder is the value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The category a flag token is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagCategory {
    /// `-I`: header search directory
    IncludeDirs,
    /// `-L`: library search directory
    LibraryDirs,
    /// `-l`: library to link
    Libraries,
}

impl FlagCategory {
    /// Every category, in display order.
    pub const ALL: [FlagCategory; 3] = [
        FlagCategory::IncludeDirs,
        FlagCategory::LibraryDirs,
        FlagCategory::Libraries,
    ];

    /// Map a two-character prefix to its category.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "-I" => Some(FlagCategory::IncludeDirs),
            "-L" => Some(FlagCategory::LibraryDirs),
            "-l" => Some(FlagCategory::Libraries),
            _ => None,
        }
    }

    /// The flag prefix for this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            FlagCategory::IncludeDirs => "-I",
            FlagCategory::LibraryDirs => "-L",
            FlagCategory::Libraries => "-l",
        }
    }

    /// The option name used in printed and serialized option sets.
    pub fn key(&self) -> &'static str {
        match self {
            FlagCategory::IncludeDirs => "include_dirs",
            FlagCategory::LibraryDirs => "library_dirs",
            FlagCategory::Libraries => "libraries",
        }
    }
}

impl fmt::Display for FlagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A recognized flag token, split into category and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagToken<'a> {
    pub category: FlagCategory,
    pub value: &'a str,
}

impl<'a> FlagToken<'a> {
    /// Split a token into its category and value.
    ///
    /// Returns `None` for tokens whose prefix is not in the table, for
    /// tokens shorter than the prefix, and for a bare prefix with no value.
    pub fn parse(token: &'a str) -> Option<Self> {
        let prefix = token.get(..2)?;
        let value = token.get(2..)?;
        let category = FlagCategory::from_prefix(prefix)?;

        if value.is_empty() {
            return None;
        }

        Some(FlagToken { category, value })
    }
}

/// Include directories, library directories and libraries, each in
/// encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    #[serde(default)]
    pub include_dirs: Vec<String>,
    #[serde(default)]
    pub library_dirs: Vec<String>,
    #[serde(default)]
    pub libraries: Vec<String>,
    /// Tokens that matched no category, kept for reporting
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<String>,
}

impl OptionSet {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition tokens into a fresh option set.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = OptionSet::new();
        for token in tokens {
            set.push_token(token.as_ref());
        }
        set
    }

    /// Split tool output on whitespace and partition the tokens.
    pub fn parse(output: &str) -> Self {
        Self::from_tokens(output.split_whitespace())
    }

    /// File a single token under its category, or under `unrecognized`.
    pub fn push_token(&mut self, token: &str) {
        match FlagToken::parse(token) {
            Some(flag) => self.push(flag.category, flag.value),
            None => self.unrecognized.push(token.to_string()),
        }
    }

    /// Append a value to a category.
    pub fn push(&mut self, category: FlagCategory, value: impl Into<String>) {
        self.get_mut(category).push(value.into());
    }

    /// Values of a category.
    pub fn get(&self, category: FlagCategory) -> &[String] {
        match category {
            FlagCategory::IncludeDirs => &self.include_dirs,
            FlagCategory::LibraryDirs => &self.library_dirs,
            FlagCategory::Libraries => &self.libraries,
        }
    }

    fn get_mut(&mut self, category: FlagCategory) -> &mut Vec<String> {
        match category {
            FlagCategory::IncludeDirs => &mut self.include_dirs,
            FlagCategory::LibraryDirs => &mut self.library_dirs,
            FlagCategory::Libraries => &mut self.libraries,
        }
    }

    /// Append include directories after the parsed ones.
    pub fn augment_include_dirs<I, S>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_dirs.extend(dirs.into_iter().map(Into::into));
    }

    /// True when no category holds a value.
    pub fn is_empty(&self) -> bool {
        FlagCategory::ALL.iter().all(|c| self.get(*c).is_empty())
    }

    /// Render the option set back into compiler/linker flags.
    pub fn to_flags(&self) -> Vec<String> {
        FlagCategory::ALL
            .iter()
            .flat_map(|c| self.get(*c).iter().map(move |v| format!("{}{}", c.prefix(), v)))
            .collect()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, category) in FlagCategory::ALL.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let values: Vec<String> = self
                .get(*category)
                .iter()
                .map(|v| format!("'{}'", v))
                .collect();
            write!(f, "'{}': [{}]", category.key(), values.join(", "))?;
        }
        write!(f, "}}")
    }
}
