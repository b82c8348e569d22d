//! Folder-path and file-name generation from configured definitions.

use crate::cache::PatternCache;
use crate::consts::{
    DEFAULT_FILE_DATE, DEFAULT_FILE_NAME, DEFAULT_FOLDER_DATE, DEFAULT_FOLDER_LOCATION, DEFAULT_FOLDER_PATH, WHITESPACE,
};
use crate::error::{Error, ErrorKind, Result};
use crate::metadata::Metadata;
use crate::path::join_components;
use crate::pattern::Pattern;
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::MAIN_SEPARATOR_STR;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

/// The folder section of the configuration.
///
/// `full_path` is the template; every other key declares a named sub-template
/// (`date = "%Y-%m-%b"`) that `full_path` can reference as `%date` or
/// `${date}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDefinition {
    #[serde(default = "default_full_path")]
    pub full_path: String,
    #[serde(flatten)]
    pub templates: BTreeMap<String, String>,
}
impl Default for FolderDefinition {
    /// `2015-12-Dec/<album, city, or "Unknown Location">`.
    fn default() -> Self {
        Self { full_path: default_full_path(), templates: BTreeMap::new() }
    }
}
impl FolderDefinition {
    /// Declared sub-templates layered over the built-in `date` and `location`.
    pub fn effective_templates(&self) -> BTreeMap<String, String> {
        let mut templates = BTreeMap::from([
            ("date".to_string(), DEFAULT_FOLDER_DATE.to_string()),
            ("location".to_string(), DEFAULT_FOLDER_LOCATION.to_string()),
        ]);
        templates.extend(self.templates.clone());
        templates
    }
}

fn default_full_path() -> String {
    DEFAULT_FOLDER_PATH.to_string()
}

/// Letter case applied to generated file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capitalization {
    #[default]
    Lower,
    Upper,
}
impl Capitalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lower => "lower",
            Self::Upper => "upper",
        }
    }

    fn apply(&self, s: &str) -> String {
        match self {
            Self::Lower => s.to_lowercase(),
            Self::Upper => s.to_uppercase(),
        }
    }
}
impl From<String> for Capitalization {
    /// Anything other than `upper` (case-insensitive) means lowercase.
    fn from(value: String) -> Self {
        match value.trim().eq_ignore_ascii_case("upper") {
            true => Self::Upper,
            false => Self::Lower,
        }
    }
}
impl From<Capitalization> for String {
    fn from(value: Capitalization) -> Self {
        value.as_str().to_string()
    }
}

/// The file section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDefinition {
    #[serde(default = "default_file_name")]
    pub name: String,
    #[serde(default)]
    pub capitalization: Capitalization,
    #[serde(flatten)]
    pub templates: BTreeMap<String, String>,
}
impl Default for FileDefinition {
    /// `2015-12-24_10-30-00-img_0001-title.jpg`.
    fn default() -> Self {
        Self {
            name: default_file_name(),
            capitalization: Capitalization::default(),
            templates: BTreeMap::new(),
        }
    }
}
impl FileDefinition {
    /// Declared sub-templates layered over the built-in `date`.
    pub fn effective_templates(&self) -> BTreeMap<String, String> {
        let mut templates = BTreeMap::from([("date".to_string(), DEFAULT_FILE_DATE.to_string())]);
        templates.extend(self.templates.clone());
        templates
    }
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

/// Generates destination folder paths and file names from [`Metadata`].
///
/// Both templates are compiled when the generator is constructed, so that
/// syntax errors surface before any file is processed. Compiled patterns come
/// from a [`PatternCache`] that can be shared between generators.
///
/// ```
/// use shoebox_template::{Metadata, PathGenerator};
/// # use chrono::NaiveDate;
/// let generator: PathGenerator = r#"%Y/%camera_make|"Unknown Camera""#.parse().unwrap();
/// let metadata = Metadata {
///     date_taken: NaiveDate::from_ymd_opt(2015, 12, 24).and_then(|d| d.and_hms_opt(10, 30, 0)),
///     ..Metadata::default()
/// };
/// let expected = ["2015", "Unknown Camera"].join(std::path::MAIN_SEPARATOR_STR);
/// assert_eq!(generator.folder_path(&metadata).unwrap(), expected);
/// ```
#[derive(Debug, Clone)]
pub struct PathGenerator {
    folder: Arc<Pattern>,
    file: Arc<Pattern>,
    capitalization: Capitalization,
    cache: Arc<PatternCache>,
}
impl FromStr for PathGenerator {
    type Err = Error;

    /// Uses `s` as the folder template (without sub-templates) and the default
    /// file-name definition.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let folder = FolderDefinition { full_path: s.to_string(), templates: BTreeMap::new() };
        Self::new(&folder, &FileDefinition::default())
    }
}
impl PathGenerator {
    /// Compiles both definitions with a fresh cache.
    pub fn new(folder: &FolderDefinition, file: &FileDefinition) -> Result<Self> {
        Self::with_cache(folder, file, Arc::default())
    }

    /// Compiles both definitions through a shared `cache`.
    ///
    /// # Errors
    /// [`ErrorKind::UnbalancedQuote`] for broken templates and
    /// [`ErrorKind::InvalidFileName`] when the file-name template contains `/`.
    pub fn with_cache(folder: &FolderDefinition, file: &FileDefinition, cache: Arc<PatternCache>) -> Result<Self> {
        let folder_pattern = cache.get_or_compile(&folder.full_path, &folder.effective_templates())?;
        let file_pattern = cache.get_or_compile(&file.name, &file.effective_templates())?;
        if !file_pattern.is_single_component() {
            exn::bail!(ErrorKind::InvalidFileName(file.name.clone()));
        }
        Ok(Self {
            folder: folder_pattern,
            file: file_pattern,
            capitalization: file.capitalization,
            cache,
        })
    }

    /// Replaces both definitions, discarding every pattern compiled so far.
    ///
    /// On error the generator keeps its previous definitions.
    pub fn reload(&mut self, folder: &FolderDefinition, file: &FileDefinition) -> Result<()> {
        self.cache.clear();
        *self = Self::with_cache(folder, file, Arc::clone(&self.cache))?;
        Ok(())
    }

    pub fn cache(&self) -> &Arc<PatternCache> {
        &self.cache
    }

    /// Renders the relative destination folder for `metadata`, joined with the
    /// platform separator. An empty string designates the destination root.
    #[instrument(level = "trace", skip_all)]
    pub fn folder_path(&self, metadata: &Metadata) -> Result<String> {
        let components = self.folder.resolve(metadata).or_raise(|| ErrorKind::Template)?;
        join_components(components).or_raise(|| ErrorKind::Template)
    }

    /// Renders the destination file name for `metadata`.
    ///
    /// Whitespace runs and path separators become `-`, and the configured
    /// [`Capitalization`] is applied to the whole name.
    #[instrument(level = "trace", skip_all)]
    pub fn file_name(&self, metadata: &Metadata) -> Result<String> {
        let name = self.file.resolve(metadata).or_raise(|| ErrorKind::Template)?.concat();
        let name = WHITESPACE.replace_all(name.trim(), "-").replace(['/', '\\'], "-");
        Ok(self.capitalization.apply(&name))
    }

    /// Renders the folder path and file name joined together.
    pub fn generate(&self, metadata: &Metadata) -> Result<String> {
        let folder = self.folder_path(metadata)?;
        let file = self.file_name(metadata)?;
        Ok(match folder.is_empty() {
            true => file,
            false => format!("{folder}{MAIN_SEPARATOR_STR}{file}"),
        })
    }
}
