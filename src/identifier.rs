//! Dotted hierarchical section identifiers such as `2.1.2`.
//!
//! An [`Identifier`] is a non-empty sequence of numeric components. Ordering is
//! componentwise and lexicographic, so a prefix sorts before every one of its
//! extensions (`2 < 2.1 < 2.1.1 < 2.2 < 10`).

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ExtractError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Vec<u32>);

impl Identifier {
    /// Parses `text` against the identifier grammar: one or more unsigned
    /// integers separated by single dots, no leading zeros (a lone `0` is
    /// allowed), no leading or trailing dot. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, ExtractError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ExtractError::format(text, "empty identifier"));
        }

        let mut components = Vec::new();
        for part in trimmed.split('.') {
            if part.is_empty() {
                return Err(ExtractError::format(text, "empty component"));
            }
            if !part.chars().all(|ch| ch.is_ascii_digit()) {
                return Err(ExtractError::format(text, "non-digit component"));
            }
            if part.len() > 1 && part.starts_with('0') {
                return Err(ExtractError::format(text, "leading zero in component"));
            }
            let value = part
                .parse::<u32>()
                .map_err(|_| ExtractError::format(text, "component out of range"))?;
            components.push(value);
        }

        Ok(Self(components))
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    pub fn level(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> u32 {
        // Non-empty by construction.
        self.0[self.0.len() - 1]
    }

    pub fn parent(&self) -> Option<Identifier> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// True when `other` is the direct parent of `self`.
    pub fn is_child_of(&self, other: &Identifier) -> bool {
        self.0.len() == other.0.len() + 1 && self.0.starts_with(&other.0)
    }

    /// The next sibling: last component incremented by one.
    pub fn expected_successor(&self) -> Identifier {
        self.with_last(self.last().saturating_add(1))
    }

    pub fn with_last(&self, last: u32) -> Identifier {
        let mut components = self.0.clone();
        let index = components.len() - 1;
        components[index] = last;
        Self(components)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, component) in self.components().iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl FromStr for Identifier {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Identifier::parse(&raw).map_err(de::Error::custom)
    }
}
