// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Data exchanged with the hosting platform and the two output databases.

use serde::{Deserialize, Serialize};

/// Repository returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct RepositoryRef
{
    /// Repository name without the owner prefix.
    pub name:           String,
    /// Browser URL, e.g. `https://github.com/owner/name`.
    pub html_url:       String,
    /// Branch used to build raw file URLs.
    pub default_branch: String,
    /// Optional project homepage.
    #[serde(default)]
    pub homepage:       Option<String,>,
    /// Optional short description.
    #[serde(default)]
    pub description:    Option<String,>,
    /// Owner login as reported by the API.
    #[serde(default)]
    pub owner:          Option<String,>,
}

impl RepositoryRef
{
    /// Author handle taken from the fourth `/`-separated segment of the
    /// browser URL, falling back to the owner login.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_scraper::RepositoryRef;
    ///
    /// let repo = RepositoryRef {
    ///     name:           "cool-addon".to_owned(),
    ///     html_url:       "https://github.com/Someone/cool-addon".to_owned(),
    ///     default_branch: "main".to_owned(),
    ///     homepage:       None,
    ///     description:    None,
    ///     owner:          None,
    /// };
    /// assert_eq!(repo.author(), "Someone");
    /// assert_eq!(repo.candidate_id(), "Someone/cool-addon");
    /// ```
    pub fn author(&self,) -> String
    {
        self.html_url
            .split('/',)
            .nth(3,)
            .filter(|segment| !segment.is_empty(),)
            .map(str::to_owned,)
            .or_else(|| self.owner.clone(),)
            .unwrap_or_default()
    }

    /// Key used for blacklist matching: `author/name`.
    pub fn candidate_id(&self,) -> String
    {
        format!("{}/{}", self.author(), self.name)
    }
}

/// Repository coordinates copied into every output record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
pub struct RepoMeta
{
    pub url:            String,
    pub name:           String,
    pub author:         String,
    pub default_branch: String,
}

impl RepoMeta
{
    /// Derives the metadata for a search result.
    pub fn from_repository(repo: &RepositoryRef,) -> Self
    {
        Self {
            url:            repo.html_url.clone(),
            name:           repo.name.clone(),
            author:         repo.author(),
            default_branch: repo.default_branch.clone(),
        }
    }

    /// Record identifier: `author/name`.
    pub fn id(&self,) -> String
    {
        format!("{}/{}", self.author, self.name)
    }

    /// Raw content URL for `path` on the default branch.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_scraper::RepoMeta;
    ///
    /// let meta = RepoMeta {
    ///     url:            "https://github.com/a/b".to_owned(),
    ///     name:           "b".to_owned(),
    ///     author:         "a".to_owned(),
    ///     default_branch: "main".to_owned(),
    /// };
    /// assert_eq!(
    ///     meta.raw_url("https://raw.githubusercontent.com/", "README.md"),
    ///     "https://raw.githubusercontent.com/a/b/main/README.md"
    /// );
    /// ```
    pub fn raw_url(&self, raw_base: &str, path: &str,) -> String
    {
        format!(
            "{}/{}/{}/{}/{}",
            raw_base.trim_end_matches('/'),
            self.author,
            self.name,
            self.default_branch,
            path.trim_start_matches('/')
        )
    }
}

/// Download information for the selected release asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
pub struct DownloadMeta
{
    pub release_url:    String,
    pub download_url:   String,
    pub file_name:      String,
    pub download_count: u64,
}

/// Accepted addon entry written to `database.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct AddonRecord
{
    pub id:                String,
    pub name:              String,
    pub description:       String,
    #[serde(rename = "author_list")]
    pub authors:           Vec<String,>,
    #[serde(rename = "feature_list")]
    pub features:          Vec<String,>,
    pub meteor_version:    String,
    pub minecraft_version: String,
    pub icon_url:          Option<String,>,
    #[serde(rename = "icon_b64")]
    pub compressed_icon:   Option<String,>,
    pub discord_url:       Option<String,>,
    #[serde(rename = "repo_data")]
    pub repo_meta:         RepoMeta,
    #[serde(rename = "download_data")]
    pub download_meta:     DownloadMeta,
}

/// Rejected repository entry written to `error_database.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ErrorRecord
{
    pub repo_meta: RepoMeta,
    pub id:        String,
    pub error:     String,
}

/// Envelope shared by both output files: `{"database": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Database<T,>
{
    pub database: Vec<T,>,
}

/// Latest release of a repository.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ReleaseInfo
{
    /// Release page URL.
    pub html_url: String,
    pub assets:   Vec<ReleaseAsset,>,
}

/// Downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ReleaseAsset
{
    pub name:                 String,
    /// Browser download URL; `None` when the platform omitted it.
    pub browser_download_url: Option<String,>,
    pub download_count:       u64,
}

/// Kind of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum EntryKind
{
    File,
    Dir,
    Other,
}

/// Entry returned by the directory listing collaborator.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct DirEntry
{
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    pub kind: EntryKind,
}

/// One page of repository search results.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct SearchPage
{
    pub items:              Vec<RepositoryRef,>,
    /// Set when the platform reports that the search timed out internally.
    pub incomplete_results: bool,
}
