// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Typed view of the `fabric.mod.json` module descriptor.
//!
//! Only the fields the scraper reads are modelled. Every field is optional so
//! presence checks happen explicitly in the pipeline instead of through
//! dynamic lookups. Fabric allows several shapes for authors, icons and
//! entrypoints; the untagged enums below accept each of them.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Entrypoint key under which Meteor addons register their main class.
pub const METEOR_ENTRYPOINT: &str = "meteor";
/// Root of Java sources inside a Gradle project.
const JAVA_SOURCE_ROOT: &str = "src/main/java";
/// Root of bundled resources inside a Gradle project.
pub const RESOURCE_ROOT: &str = "src/main/resources";

/// Subset of `fabric.mod.json` used for addon extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize,)]
pub struct ModDescriptor
{
    #[serde(default)]
    pub name:        Option<String,>,
    #[serde(default)]
    pub description: Option<String,>,
    #[serde(default)]
    pub authors:     Option<Vec<Person,>,>,
    #[serde(default)]
    pub icon:        Option<Icon,>,
    #[serde(default)]
    pub entrypoints: Option<HashMap<String, Vec<Entrypoint,>,>,>,
}

/// Author entry: either a bare name or a contact object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
#[serde(untagged)]
pub enum Person
{
    Name(String,),
    Detailed
    {
        name: String,
    },
}

impl Person
{
    pub fn name(&self,) -> &str
    {
        match self {
            Self::Name(name,) | Self::Detailed {
                name,
            } => name.as_str(),
        }
    }
}

/// Icon declaration: a single path or a map from pixel size to path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
#[serde(untagged)]
pub enum Icon
{
    Path(String,),
    Sizes(BTreeMap<String, String,>,),
}

/// Entrypoint entry: a class name or an object with a `value` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
#[serde(untagged)]
pub enum Entrypoint
{
    Class(String,),
    Detailed
    {
        value: String,
    },
}

impl Entrypoint
{
    pub fn value(&self,) -> &str
    {
        match self {
            Self::Class(value,) | Self::Detailed {
                value,
            } => value.as_str(),
        }
    }
}

impl ModDescriptor
{
    /// Parses descriptor JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the document is not
    /// valid JSON or a known field has an unsupported shape.
    pub fn parse(text: &str,) -> Result<Self, serde_json::Error,>
    {
        serde_json::from_str(text,)
    }

    /// Declared author names, or `None` when the descriptor has no author
    /// list.
    pub fn author_names(&self,) -> Option<Vec<String,>,>
    {
        self.authors
            .as_ref()
            .map(|authors| authors.iter().map(|person| person.name().to_owned(),).collect(),)
    }

    /// First class registered under the Meteor entrypoint.
    pub fn main_class(&self,) -> Option<MainClass,>
    {
        self.entrypoints
            .as_ref()?
            .get(METEOR_ENTRYPOINT,)?
            .first()
            .map(Entrypoint::value,)
            .and_then(MainClass::parse,)
    }

    /// Display name when declared and non-blank.
    pub fn display_name(&self,) -> Option<&str,>
    {
        non_blank(self.name.as_deref(),)
    }

    /// Description when declared and non-blank.
    pub fn display_description(&self,) -> Option<&str,>
    {
        non_blank(self.description.as_deref(),)
    }

    /// Icon path relative to the resource root.
    ///
    /// For size maps the entry with the largest numeric size is chosen.
    pub fn icon_path(&self,) -> Option<&str,>
    {
        let path = match self.icon.as_ref()? {
            Icon::Path(path,) => path.as_str(),
            Icon::Sizes(sizes,) => sizes
                .iter()
                .max_by_key(|(size, _,)| size.parse::<u32>().unwrap_or(0,),)
                .map(|(_, path,)| path.as_str(),)?,
        };
        non_blank(Some(path,),)
    }
}

fn non_blank(value: Option<&str,>,) -> Option<&str,>
{
    value.filter(|value| !value.trim().is_empty(),)
}

/// Fully-qualified main class declared by the entrypoint.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct MainClass
{
    qualified: String,
}

impl MainClass
{
    /// Accepts dotted Java class names such as `com.example.Addon`.
    pub fn parse(qualified: &str,) -> Option<Self,>
    {
        let qualified = qualified.trim();
        let valid = !qualified.is_empty()
            && qualified.split('.',).all(|segment| {
                !segment.is_empty()
                    && segment.chars().all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$',)
            },);

        valid.then(|| Self {
            qualified: qualified.to_owned(),
        },)
    }

    pub fn qualified_name(&self,) -> &str
    {
        &self.qualified
    }

    /// Package portion, empty for classes in the default package.
    pub fn package(&self,) -> &str
    {
        self.qualified.rsplit_once('.',).map_or("", |(package, _,)| package,)
    }

    /// Repository path of the class source file.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_scraper::MainClass;
    ///
    /// let class = MainClass::parse("com.example.addon.Addon",).expect("valid class",);
    /// assert_eq!(class.source_path(), "src/main/java/com/example/addon/Addon.java");
    /// assert_eq!(class.modules_path(), "src/main/java/com/example/addon/modules");
    /// ```
    pub fn source_path(&self,) -> String
    {
        format!("{JAVA_SOURCE_ROOT}/{}.java", self.qualified.replace('.', "/"))
    }

    /// Conventional `modules` directory next to the main class.
    pub fn modules_path(&self,) -> String
    {
        let package = self.package();
        if package.is_empty() {
            format!("{JAVA_SOURCE_ROOT}/modules")
        } else {
            format!("{JAVA_SOURCE_ROOT}/{}/modules", package.replace('.', "/"))
        }
    }
}
