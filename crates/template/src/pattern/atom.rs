use crate::metadata::Scope;

/// A named metadata field referenced by `%name` in a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Location(Scope),
    CameraMake,
    CameraModel,
    Album,
    Title,
    OriginalName,
    BaseName,
    Extension,
    /// A name that is neither a known field nor a declared sub-template.
    Unknown(String),
}
impl Field {
    pub fn from_name(name: &str) -> Self {
        match name {
            "hamlet" => Self::Location(Scope::Hamlet),
            "village" => Self::Location(Scope::Village),
            "town" => Self::Location(Scope::Town),
            "city" => Self::Location(Scope::City),
            "county" => Self::Location(Scope::County),
            "state" => Self::Location(Scope::State),
            "country" => Self::Location(Scope::Country),
            "location" => Self::Location(Scope::Default),
            "camera_make" => Self::CameraMake,
            "camera_model" => Self::CameraModel,
            "album" => Self::Album,
            "title" => Self::Title,
            "original_name" => Self::OriginalName,
            "base_name" => Self::BaseName,
            "extension" => Self::Extension,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Smallest substitutable unit of a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    /// Text copied verbatim, including unquoted `-` and the contents of quotes.
    Literal(String),
    /// A strftime directive (`%Y`, `%-d`, `%b`) applied to the capture date.
    Time(String),
    Field(Field),
}

/// Returns the field name at the start of `s` (the text following a `%`).
///
/// A name is a run of `[a-z0-9_]` starting with a letter, without trailing
/// underscores, at least two characters long. Anything shorter is left for the
/// strftime directive parser, which keeps `%d_%m` and `%Hh%M` working.
pub(crate) fn field_name(s: &str) -> Option<&str> {
    if !s.starts_with(|c: char| c.is_ascii_lowercase()) {
        return None;
    }
    let end = s.find(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')).unwrap_or(s.len());
    let name = s[..end].trim_end_matches('_');
    (name.len() >= 2).then_some(name)
}

/// Byte length of the strftime directive at the start of `s` (the text
/// following a `%`), or zero when no directive letter follows.
pub(crate) fn directive_len(s: &str) -> usize {
    let modifiers = s
        .bytes()
        .take_while(|b| matches!(b, b'-' | b'_' | b'.' | b':' | b'#' | b'0'..=b'9'))
        .take(4)
        .count();
    match s.as_bytes().get(modifiers) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'%' => modifiers + 1,
        _ => 0,
    }
}
