use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Prefix older imports baked into file names (`2015-12-24_10-30-00-IMG_0001`).
regex!(DATED_NAME_PREFIX, r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}-");
regex!(WHITESPACE, r"\s+");

/// Folder definition used when the configuration has none.
pub const DEFAULT_FOLDER_PATH: &str = r#"%date/%album|%location|"Unknown Location""#;
pub const DEFAULT_FOLDER_DATE: &str = "%Y-%m-%b";
pub const DEFAULT_FOLDER_LOCATION: &str = "%city";

/// File-name definition used when the configuration has none.
pub const DEFAULT_FILE_NAME: &str = "%date-%original_name-%title.%extension";
pub const DEFAULT_FILE_DATE: &str = "%Y-%m-%d_%H-%M-%S";
