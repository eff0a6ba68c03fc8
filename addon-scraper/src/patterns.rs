// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Pure text extractors applied to repository metadata and source files.
//!
//! - [`find_discord_invite`] locates a community invite link.
//! - [`features_from_source`] lists modules registered in an addon's main
//!   class.
//! - [`is_default_readme`] recognises the untouched addon template README.
//! - [`merge_features`] combines feature lists into a sorted, distinct set.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

/// Title line of the upstream addon template README.
pub const TEMPLATE_TITLE: &str = "Meteor Addon Template";
/// Description line of the upstream addon template README.
pub const TEMPLATE_DESCRIPTION: &str = "A template to allow easy usage of the Meteor Addon API.";

static INVITE_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(
        r#"\bhttps://(?:www\.)?(?:discord\.gg/|discord\.com/invite/)[A-Za-z0-9-]+(?:\?[^\s"'<>()\[\]]*)?"#,
    )
    .expect("invite pattern is valid",)
},);

/// Sentence punctuation that may trail a link without belonging to it.
const INVITE_TRAILING: [char; 6] = ['.', ',', ';', ':', '!', '?',];

static FEATURE_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r"\badd\(\s*new\s+(?:[A-Za-z_$][A-Za-z0-9_$]*\s*\.\s*)*([A-Za-z_$][A-Za-z0-9_$]*)\s*\(",)
        .expect("feature pattern is valid",)
},);

/// Returns the first Discord invite link found in `text`.
///
/// Accepts `https://discord.gg/<code>` and `https://discord.com/invite/<code>`
/// with an optional query string. Links without the `https://` scheme or with
/// a different host are ignored. Punctuation ending a sentence is not part of
/// the link.
///
/// # Examples
///
/// ```
/// use addon_scraper::find_discord_invite;
///
/// let text = "Join us: https://discord.gg/abc123 for support";
/// assert_eq!(find_discord_invite(text), Some("https://discord.gg/abc123"));
/// assert_eq!(find_discord_invite("discord.gg/abc"), None);
/// ```
pub fn find_discord_invite(text: &str,) -> Option<&str,>
{
    if text.is_empty() {
        return None;
    }
    INVITE_PATTERN.find(text,).map(|found| found.as_str().trim_end_matches(INVITE_TRAILING,),)
}

/// Extracts the class names passed as `add(new <Name>(...))` in `source`.
///
/// Qualified constructors such as `new combat.Fly()` yield the simple name.
/// The result is sorted; duplicates are kept and removed later by
/// [`merge_features`]. Returns an empty list when nothing matches.
pub fn features_from_source(source: &str,) -> Vec<String,>
{
    let mut features: Vec<String,> = FEATURE_PATTERN
        .captures_iter(source,)
        .filter_map(|captures| captures.get(1,),)
        .map(|name| name.as_str().to_owned(),)
        .collect();
    features.sort();
    features
}

/// Returns `true` when `readme` still contains both template phrases.
///
/// Matching only one phrase is not enough: addons frequently keep the title
/// line while replacing the description.
pub fn is_default_readme(readme: &str,) -> bool
{
    readme.contains(TEMPLATE_TITLE,) && readme.contains(TEMPLATE_DESCRIPTION,)
}

/// Merges two feature lists into a lexicographically sorted, distinct list.
///
/// # Examples
///
/// ```
/// use addon_scraper::merge_features;
///
/// let merged = merge_features(
///     vec!["Zeta".to_owned(), "Alpha".to_owned()],
///     vec!["Alpha".to_owned(), "Beta".to_owned()],
/// );
/// assert_eq!(merged, ["Alpha", "Beta", "Zeta"]);
/// ```
pub fn merge_features(primary: Vec<String,>, secondary: Vec<String,>,) -> Vec<String,>
{
    primary.into_iter().chain(secondary,).collect::<BTreeSet<_,>>().into_iter().collect()
}
