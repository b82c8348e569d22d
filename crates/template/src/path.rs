//! Normalization of rendered folder paths.

use crate::error::{ErrorKind, Result};
use std::path::{Component, MAIN_SEPARATOR_STR, Path};

/// Joins rendered components and normalizes the result into a relative path
/// using the platform separator.
///
/// Components may themselves contain `/` (from quoted literals or directives
/// such as `%D`), which become nested directories. `.` segments are dropped and
/// `..` segments consume the previous segment.
///
/// An empty result is valid and designates the destination root itself.
///
/// # Errors
/// [`ErrorKind::InvalidPath`] when the path would leave the destination root,
/// is absolute with a prefix (`C:`), or contains NUL bytes.
///
/// ```
/// use shoebox_template::join_components;
/// assert_eq!(join_components(["2017", "UK/Carlisle"]).unwrap(), ["2017", "UK", "Carlisle"].join(std::path::MAIN_SEPARATOR_STR));
/// assert_eq!(join_components(["a", "..", "b"]).unwrap(), "b");
/// assert!(join_components(["..", "etc"]).is_err());
/// ```
pub fn join_components<I, S>(components: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = components.into_iter().map(|c| c.as_ref().to_string()).collect::<Vec<_>>().join("/");
    let invalid = || ErrorKind::InvalidPath(joined.clone());
    let mut normalized: Vec<String> = Vec::new();
    for component in Path::new(&joined).components() {
        match component {
            Component::Normal(s) => {
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                normalized.push(s.to_string_lossy().into_owned());
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if normalized.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    Ok(normalized.join(MAIN_SEPARATOR_STR))
}
