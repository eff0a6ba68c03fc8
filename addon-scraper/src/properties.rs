// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Parser for the `key=value` build configuration format used by
//! `gradle.properties`.
//!
//! Lines that are blank, start with `;`, `#` or `'`, or contain no `=` are
//! skipped. Keys and values are trimmed, a value wrapped in matching single
//! or double quotes is unquoted, and the first occurrence of a key wins.
//! Values are never coerced; interpretation is left to the caller.

use std::collections::HashMap;

/// Comment prefixes that cause a line to be ignored.
const COMMENT_PREFIXES: [char; 3] = [';', '#', '\'',];

/// Lookup table produced from a properties document.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct Properties
{
    entries: HashMap<String, String,>,
}

impl Properties
{
    /// Parses the provided text into a lookup table.
    ///
    /// Returns `None` when the input is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_scraper::Properties;
    ///
    /// let props = Properties::parse("minecraft_version=1.19.3\n# note\nmeteor_version = '0.5.2'",)
    ///     .expect("non-empty input",);
    /// assert_eq!(props.get("minecraft_version"), Some("1.19.3"));
    /// assert_eq!(props.get("meteor_version"), Some("0.5.2"));
    /// ```
    pub fn parse(text: &str,) -> Option<Self,>
    {
        if text.is_empty() {
            return None;
        }

        let mut entries = HashMap::new();
        for line in text.lines() {
            if !should_parse(line,) {
                continue;
            }

            let Some((raw_key, raw_value,),) = line.split_once('=',) else {
                continue;
            };

            let key = raw_key.trim();
            if entries.contains_key(key,) {
                continue;
            }

            entries.insert(key.to_owned(), unquote(raw_value.trim(),).to_owned(),);
        }

        Some(Self {
            entries,
        },)
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &str,) -> Option<&str,>
    {
        self.entries.get(key,).map(String::as_str,)
    }

    /// Returns the value stored for `key` when it is present and non-empty.
    pub fn get_non_empty(&self, key: &str,) -> Option<&str,>
    {
        self.get(key,).filter(|value| !value.is_empty(),)
    }

    /// Number of parsed entries.
    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    /// Whether the document contained no parseable entries.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }
}

fn should_parse(line: &str,) -> bool
{
    if line.is_empty() || line.starts_with(COMMENT_PREFIXES,) {
        return false;
    }
    line.contains('=',)
}

fn unquote(value: &str,) -> &str
{
    let quoted = value.len() >= 2
        && ((value.starts_with('"',) && value.ends_with('"',))
            || (value.starts_with('\'',) && value.ends_with('\'',)));

    if quoted { &value[1..value.len() - 1] } else { value }
}
