//! Path templates for organizing photos and videos.
//!
//! A configured folder template such as `%Y-%m-%b/%album|%city|"Unknown Location"`
//! is compiled once into a [`Pattern`] and then resolved against the
//! [`Metadata`] of each media file. [`PathGenerator`] ties a folder template and
//! a file-name template together.

mod cache;
mod consts;
pub mod error;
mod generator;
mod metadata;
mod path;
mod pattern;
mod resolve;

pub use crate::cache::PatternCache;
pub use crate::consts::{
    DEFAULT_FILE_DATE, DEFAULT_FILE_NAME, DEFAULT_FOLDER_DATE, DEFAULT_FOLDER_LOCATION, DEFAULT_FOLDER_PATH,
};
pub use crate::generator::{Capitalization, FileDefinition, FolderDefinition, PathGenerator};
pub use crate::metadata::{Coordinates, Metadata, Place, PlaceResolver, Scope};
pub use crate::path::join_components;
pub use crate::pattern::{Atom, Field, Pattern};
pub use crate::resolve::{Resolution, Sentinel};
