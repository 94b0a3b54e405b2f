//! Release-channel identifiers and symbolic-name resolution
//!
//! A [`Channel`] wraps the backend's index-alias suffix (for example
//! `nixos-unstable` or `nixos-24.11`). Classification is derived purely
//! from the string shape, and symbolic names (`unstable`, `stable`,
//! `beta`, `flakes`) resolve against the set of channels discovered
//! from the backend.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Alias suffix of the rolling-release channel
pub const UNSTABLE_CHANNEL: &str = "nixos-unstable";

/// Alias suffix of the flakes index group
pub const FLAKES_CHANNEL: &str = "group-manual";

static STABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+-[0-9]+\.[0-9]+$").expect("stable channel pattern"));
static BETA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+-[0-9]+\.[0-9]+-beta$").expect("beta channel pattern"));

/// Immutable identifier for a release-channel index alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel {
    value: String,
}

impl Channel {
    /// The rolling-release sentinel channel
    pub fn unstable() -> Self {
        Self {
            value: UNSTABLE_CHANNEL.to_string(),
        }
    }

    /// The flakes index-group sentinel channel
    pub fn flakes() -> Self {
        Self {
            value: FLAKES_CHANNEL.to_string(),
        }
    }

    /// Construct a channel from a discovered alias suffix
    pub fn from_value(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::Validation(
                "channel value must not be empty".to_string(),
            ));
        }
        Ok(Self { value })
    }

    /// The raw alias suffix, embedded verbatim into index names
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_unstable(&self) -> bool {
        self.value == UNSTABLE_CHANNEL
    }

    pub fn is_flakes(&self) -> bool {
        self.value == FLAKES_CHANNEL
    }

    /// Matches release identifiers of the shape `name-D.D`
    pub fn is_stable(&self) -> bool {
        STABLE_RE.is_match(&self.value)
    }

    /// Matches preview identifiers of the shape `name-D.D-beta`
    pub fn is_beta(&self) -> bool {
        BETA_RE.is_match(&self.value)
    }

    /// Resolve a symbolic channel name against the discovered channel set.
    ///
    /// `symbolic` is matched case-insensitively against `unstable`,
    /// `stable`, `beta` and `flakes`; anything else is a validation
    /// error. A recognized name with no matching member of `available`
    /// is a resolution error.
    ///
    /// `stable` and `beta` pick the lexicographically greatest matching
    /// value. This assumes release identifiers keep a consistent digit
    /// width (`nixos-24.11`, `nixos-25.05`, ...); switching to numeric
    /// comparison would change the observable ordering and is
    /// deliberately not done.
    pub fn parse(symbolic: &str, available: &[Channel]) -> Result<Channel> {
        match symbolic.to_ascii_lowercase().as_str() {
            "unstable" => Self::find_first(available, Channel::is_unstable, "unstable"),
            "flakes" => Self::find_first(available, Channel::is_flakes, "flakes"),
            "stable" => Self::find_greatest(available, Channel::is_stable, "stable"),
            "beta" => Self::find_greatest(available, Channel::is_beta, "beta"),
            other => Err(Error::Validation(format!(
                "unknown channel '{}', expected one of: unstable, stable, beta, flakes",
                other
            ))),
        }
    }

    fn find_first(
        available: &[Channel],
        predicate: fn(&Channel) -> bool,
        name: &str,
    ) -> Result<Channel> {
        available.iter().find(|c| predicate(c)).cloned().ok_or_else(|| {
            Error::Resolution(format!(
                "no {} channel among {} discovered channels",
                name,
                available.len()
            ))
        })
    }

    fn find_greatest(
        available: &[Channel],
        predicate: fn(&Channel) -> bool,
        name: &str,
    ) -> Result<Channel> {
        available
            .iter()
            .filter(|c| predicate(c))
            .max_by(|a, b| a.value.cmp(&b.value))
            .cloned()
            .ok_or_else(|| {
                Error::Resolution(format!(
                    "no {} channel among {} discovered channels",
                    name,
                    available.len()
                ))
            })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(values: &[&str]) -> Vec<Channel> {
        values
            .iter()
            .map(|v| Channel::from_value(*v).unwrap())
            .collect()
    }

    #[test]
    fn test_from_value_rejects_empty() {
        assert!(matches!(
            Channel::from_value(""),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            Channel::from_value("   "),
            Err(Error::Validation(_))
        ));
        assert!(Channel::from_value("nixos-24.11").is_ok());
    }

    #[test]
    fn test_classification_shapes() {
        assert!(Channel::unstable().is_unstable());
        assert!(Channel::flakes().is_flakes());

        let stable = Channel::from_value("nixos-24.11").unwrap();
        assert!(stable.is_stable());
        assert!(!stable.is_beta());
        assert!(!stable.is_unstable());
        assert!(!stable.is_flakes());

        let beta = Channel::from_value("nixos-25.05-beta").unwrap();
        assert!(beta.is_beta());
        assert!(!beta.is_stable());
    }

    #[test]
    fn test_display_returns_raw_value() {
        let channel = Channel::from_value("nixos-24.11").unwrap();
        assert_eq!(channel.to_string(), "nixos-24.11");
        assert_eq!(Channel::unstable().to_string(), "nixos-unstable");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let available = channels(&["nixos-unstable"]);
        assert_eq!(
            Channel::parse("UNSTABLE", &available).unwrap(),
            Channel::unstable()
        );
    }

    #[test]
    fn test_parse_stable_picks_ordinal_max() {
        let available = channels(&["pkg-23.11", "pkg-25.05", "pkg-24.11"]);
        let resolved = Channel::parse("stable", &available).unwrap();
        assert_eq!(resolved.value(), "pkg-25.05");
    }

    #[test]
    fn test_parse_empty_list_is_resolution_error() {
        assert!(matches!(
            Channel::parse("unstable", &[]),
            Err(Error::Resolution(_))
        ));
        assert!(matches!(
            Channel::parse("stable", &[]),
            Err(Error::Resolution(_))
        ));
    }

    #[test]
    fn test_parse_unknown_keyword_is_validation_error() {
        let available = channels(&["nixos-unstable", "nixos-24.11"]);
        let err = Channel::parse("bogus", &available).unwrap_err();
        match err {
            Error::Validation(message) => {
                assert!(message.contains("unstable"));
                assert!(message.contains("stable"));
                assert!(message.contains("beta"));
                assert!(message.contains("flakes"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
