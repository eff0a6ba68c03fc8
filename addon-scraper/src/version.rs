// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Minecraft version policy applied to parsed build configuration.

use crate::properties::Properties;

/// Build configuration key carrying the Minecraft version.
pub const MINECRAFT_VERSION_KEY: &str = "minecraft_version";
/// Build configuration key carrying the Meteor client version.
pub const METEOR_VERSION_KEY: &str = "meteor_version";

/// Versions accepted when no configuration overrides them.
pub const DEFAULT_ACCEPTED_VERSIONS: &[&str] = &["1.19.2", "1.19.3",];

/// Target platform versions read from `gradle.properties`.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct VersionMeta
{
    pub minecraft: String,
    pub meteor:    String,
}

impl VersionMeta
{
    /// Extracts both versions; `None` when either is missing or empty.
    pub fn from_properties(properties: &Properties,) -> Option<Self,>
    {
        let minecraft = properties.get_non_empty(MINECRAFT_VERSION_KEY,)?;
        let meteor = properties.get_non_empty(METEOR_VERSION_KEY,)?;
        Some(Self {
            minecraft: minecraft.to_owned(), meteor: meteor.to_owned(),
        },)
    }
}

/// Accepts a Minecraft version when it contains one of the configured
/// version strings.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct VersionGate
{
    accepted: Vec<String,>,
}

impl VersionGate
{
    /// Creates a gate from the accepted version substrings. Blank entries
    /// are dropped so they cannot match every input.
    pub fn new<I,>(accepted: I,) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String,>,
    {
        Self {
            accepted: accepted
                .into_iter()
                .map(Into::into,)
                .filter(|version: &String| !version.trim().is_empty(),)
                .collect(),
        }
    }

    /// Configured version substrings.
    pub fn accepted(&self,) -> &[String]
    {
        &self.accepted
    }

    /// Whether `version` is acceptable. Missing and empty input is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_scraper::VersionGate;
    ///
    /// let gate = VersionGate::new(["1.19.2", "1.19.3"],);
    /// assert!(gate.accepts(Some("1.19.3")));
    /// assert!(!gate.accepts(Some("1.18.2")));
    /// assert!(!gate.accepts(None));
    /// ```
    pub fn accepts(&self, version: Option<&str,>,) -> bool
    {
        match version {
            Some(version,) if !version.is_empty() => {
                self.accepted.iter().any(|accepted| version.contains(accepted.as_str(),),)
            }
            _ => false,
        }
    }
}

impl Default for VersionGate
{
    fn default() -> Self
    {
        Self::new(DEFAULT_ACCEPTED_VERSIONS.iter().copied(),)
    }
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn default_gate_accepts_configured_versions()
    {
        let gate = VersionGate::default();
        assert!(gate.accepts(Some("1.19.2")));
        assert!(gate.accepts(Some("1.19.3")));
        assert!(gate.accepts(Some("1.19.3-rc1")));
        assert!(!gate.accepts(Some("1.19.4")));
        assert!(!gate.accepts(Some("1.19")));
        assert!(!gate.accepts(Some("")));
        assert!(!gate.accepts(None));
    }

    #[test]
    fn blank_entries_are_ignored()
    {
        let gate = VersionGate::new(["", "  ", "1.20.1",],);
        assert_eq!(gate.accepted(), ["1.20.1"]);
        assert!(!gate.accepts(Some("1.19.2")));
    }

    #[test]
    fn version_meta_requires_both_keys()
    {
        let full = Properties::parse("minecraft_version=1.19.3\nmeteor_version=0.5.2",)
            .expect("not empty",);
        assert_eq!(
            VersionMeta::from_properties(&full),
            Some(VersionMeta {
                minecraft: "1.19.3".to_owned(), meteor: "0.5.2".to_owned(),
            })
        );

        let partial = Properties::parse("minecraft_version=1.19.3\nmeteor_version=",)
            .expect("not empty",);
        assert_eq!(VersionMeta::from_properties(&partial), None);
    }

    proptest! {
        #[test]
        fn gate_accepts_only_inputs_containing_a_configured_version(
            version in "[0-9.]{0,8}",
        ) {
            let gate = VersionGate::new(["1.19.2", "1.19.3"]);
            let expected = version.contains("1.19.2") || version.contains("1.19.3");
            prop_assert_eq!(gate.accepts(Some(version.as_str())), expected);
        }
    }
}
