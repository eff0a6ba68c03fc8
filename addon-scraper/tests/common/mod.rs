// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory host and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    io::Cursor,
    sync::{Arc, Mutex},
};

use addon_scraper::{
    AddonHost, Blacklist, CancelHandle, DirEntry, EntryKind, FetchError, Pipeline,
    PipelineSettings, ReleaseAsset, ReleaseInfo, RepoMeta, RepositoryRef, SearchPage, VersionGate,
};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub const RAW: &str = "https://raw.test";

pub const README: &str = "# Cool Addon\n\nAdds cool modules. Support: https://discord.gg/cool123\n";
pub const BUILD_CONFIG: &str =
    "# versions\nminecraft_version=1.19.3\nmeteor_version=\"0.5.2\"\nloader_version=0.14.11\n";
pub const DESCRIPTOR: &str = r#"{
    "schemaVersion": 1,
    "id": "cool-addon",
    "name": "Cool Addon",
    "description": "Does cool things",
    "authors": ["Alice", {"name": "Bob", "contact": {}}],
    "icon": "assets/cool/icon.png",
    "entrypoints": {
        "meteor": ["com.cool.addon.CoolAddon"],
        "client": [{"value": "com.cool.addon.Client"}]
    }
}"#;
pub const MAIN_CLASS_PATH: &str = "src/main/java/com/cool/addon/CoolAddon.java";
pub const MODULES_PATH: &str = "src/main/java/com/cool/addon/modules";
pub const MAIN_SOURCE: &str = r#"
public class CoolAddon extends MeteorAddon {
    @Override
    public void onInitialize() {
        Modules.get().add(new Zeta());
        Modules.get().add( new Alpha() );
        Modules.get().add(new Alpha());
    }
}
"#;
pub const ICON_PATH: &str = "src/main/resources/assets/cool/icon.png";

/// Repository as returned by the search collaborator.
pub fn repository(author: &str, name: &str,) -> RepositoryRef
{
    RepositoryRef {
        name:           name.to_owned(),
        html_url:       format!("https://github.com/{author}/{name}"),
        default_branch: "main".to_owned(),
        homepage:       None,
        description:    None,
        owner:          Some(author.to_owned(),),
    }
}

/// Raw URL of `path` in `author/name` on `main`.
pub fn raw(author: &str, name: &str, path: &str,) -> String
{
    format!("{RAW}/{author}/{name}/main/{path}")
}

pub fn file(name: &str, dir: &str,) -> DirEntry
{
    DirEntry {
        name: name.to_owned(), path: format!("{dir}/{name}"), kind: EntryKind::File,
    }
}

pub fn dir(name: &str, parent: &str,) -> DirEntry
{
    DirEntry {
        name: name.to_owned(), path: format!("{parent}/{name}"), kind: EntryKind::Dir,
    }
}

pub fn asset(name: &str,) -> ReleaseAsset
{
    ReleaseAsset {
        name:                 name.to_owned(),
        browser_download_url: Some(format!("https://downloads.test/{name}"),),
        download_count:       7,
    }
}

pub fn release(author: &str, name: &str, assets: Vec<ReleaseAsset,>,) -> ReleaseInfo
{
    ReleaseInfo {
        html_url: format!("https://github.com/{author}/{name}/releases/tag/v1.0.0"),
        assets,
    }
}

pub fn png(width: u32, height: u32,) -> Vec<u8,>
{
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([10, 120, 250, 255,],),
    ),);
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes,), ImageFormat::Png,).expect("encode png",);
    bytes
}

/// Scriptable in-memory [`AddonHost`].
#[derive(Debug, Default,)]
pub struct FakeHost
{
    /// Raw files by URL.
    pub files:        HashMap<String, Vec<u8,>,>,
    /// URLs whose download fails with a transient error.
    pub failing:      HashSet<String,>,
    /// Directory listings keyed by `author/name:path`.
    pub directories:  HashMap<String, Vec<DirEntry,>,>,
    /// Latest release by `author/name`; missing entries are not found.
    pub releases:     HashMap<String, Result<ReleaseInfo, FetchError,>,>,
    pub repositories: HashMap<String, RepositoryRef,>,
    pub pages:        Vec<SearchPage,>,
    pub search_error: Option<FetchError,>,
    /// Fires the handle when the given URL is fetched.
    pub cancel_on:    Option<(String, Arc<CancelHandle,>,),>,
    pub calls:        Mutex<Vec<String,>,>,
}

impl FakeHost
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Host serving a complete, valid addon at `author/name`.
    pub fn with_addon(mut self, author: &str, name: &str,) -> Self
    {
        self.add_text(author, name, "README.md", README,);
        self.add_text(author, name, "gradle.properties", BUILD_CONFIG,);
        self.add_text(author, name, "src/main/resources/fabric.mod.json", DESCRIPTOR,);
        self.add_text(author, name, MAIN_CLASS_PATH, MAIN_SOURCE,);
        self.files.insert(raw(author, name, ICON_PATH,), png(200, 100,),);
        self.releases.insert(
            format!("{author}/{name}"),
            Ok(release(author, name, vec![
                asset("cool-1.0.0-dev.jar",),
                asset("cool-1.0.0-sources.jar",),
                asset("cool-1.0.0.jar",),
            ],),),
        );
        self.repositories.insert(format!("{author}/{name}"), repository(author, name,),);
        self
    }

    pub fn add_text(&mut self, author: &str, name: &str, path: &str, text: &str,)
    {
        self.files.insert(raw(author, name, path,), text.as_bytes().to_vec(),);
    }

    pub fn remove(&mut self, author: &str, name: &str, path: &str,)
    {
        self.files.remove(&raw(author, name, path,),);
    }

    pub fn add_directory(&mut self, author: &str, name: &str, path: &str, entries: Vec<DirEntry,>,)
    {
        self.directories.insert(format!("{author}/{name}:{path}"), entries,);
    }

    pub fn calls(&self,) -> Vec<String,>
    {
        self.calls.lock().expect("calls lock",).clone()
    }

    fn log(&self, call: String,)
    {
        self.calls.lock().expect("calls lock",).push(call,);
    }

    fn download(&self, url: &str,) -> Result<Vec<u8,>, FetchError,>
    {
        self.log(format!("fetch {url}"),);
        if let Some((trigger, handle,),) = &self.cancel_on {
            if trigger == url {
                handle.cancel();
            }
        }
        if self.failing.contains(url,) {
            return Err(FetchError::transient(url, "connection reset",),);
        }
        self.files.get(url,).cloned().ok_or_else(|| FetchError::not_found(url,),)
    }
}

#[async_trait]
impl AddonHost for FakeHost
{
    async fn search_repositories(
        &self,
        _query: &str,
        page: u32,
        _per_page: u32,
    ) -> Result<SearchPage, FetchError,>
    {
        self.log(format!("search {page}"),);
        if let Some(error,) = &self.search_error {
            return Err(error.clone(),);
        }
        Ok(self.pages.get(page as usize - 1,).cloned().unwrap_or_default(),)
    }

    async fn repository(&self, owner: &str, name: &str,) -> Result<RepositoryRef, FetchError,>
    {
        let id = format!("{owner}/{name}");
        self.log(format!("repository {id}"),);
        self.repositories.get(&id,).cloned().ok_or_else(|| FetchError::not_found(id,),)
    }

    async fn fetch_text(&self, url: &str,) -> Result<String, FetchError,>
    {
        self.download(url,).map(|bytes| String::from_utf8_lossy(&bytes,).into_owned(),)
    }

    async fn fetch_bytes(&self, url: &str,) -> Result<Vec<u8,>, FetchError,>
    {
        self.download(url,)
    }

    async fn list_directory(
        &self,
        repo: &RepoMeta,
        path: &str,
    ) -> Result<Vec<DirEntry,>, FetchError,>
    {
        let key = format!("{}:{path}", repo.id());
        self.log(format!("list {key}"),);
        self.directories.get(&key,).cloned().ok_or_else(|| FetchError::not_found(key,),)
    }

    async fn latest_release(&self, repo: &RepoMeta,) -> Result<ReleaseInfo, FetchError,>
    {
        let id = repo.id();
        self.log(format!("release {id}"),);
        self.releases.get(&id,).cloned().unwrap_or_else(|| Err(FetchError::not_found(id,),),)
    }
}

pub fn settings() -> PipelineSettings
{
    PipelineSettings {
        raw_base: RAW.to_owned(), icon_size: 64,
    }
}

pub fn pipeline(host: FakeHost,) -> Pipeline<FakeHost,>
{
    pipeline_with(host, Blacklist::default(),)
}

pub fn pipeline_with(host: FakeHost, blacklist: Blacklist,) -> Pipeline<FakeHost,>
{
    Pipeline::new(host, Arc::new(blacklist,), VersionGate::default(), settings(),)
}
