//! Evaluation of a compiled [`Pattern`] against a [`Metadata`] record.
//!
//! Every atom resolves to a [`Resolution`]: either a value or a [`Sentinel`]
//! describing why no value exists. A candidate is accepted only when all of its
//! atoms resolved to values. Otherwise the next candidate of the component is
//! tried, and the last candidate is rendered anyway, with each sentinel replaced
//! by its placeholder text. Whole-path alternatives follow the same rule one
//! level up: the first alternative whose components were all accepted wins, and
//! the last alternative is rendered regardless.

use crate::consts::DATED_NAME_PREFIX;
use crate::error::{ErrorKind, Result};
use crate::metadata::Metadata;
use crate::pattern::{Alternative, Atom, Candidate, Component, Field, Pattern};
use derive_more::Display;
use exn::OptionExt;
use std::fmt::Write;
use std::path::Path;

/// Why an atom has no value.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// The media carries no GPS coordinates.
    #[display("NO GPS")]
    NoGps,
    /// GPS coordinates exist, but the requested place scope did not resolve.
    #[display("UNKNOWN LOCATION")]
    UnknownLocation,
    #[display("NO CAMERA INFO")]
    NoCameraInfo,
    /// A plain field (album, title, ...) or an unknown name had no value.
    #[display("")]
    Missing,
}

/// The outcome of resolving one [`Atom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Sentinel(Sentinel),
}

impl Atom {
    /// Resolves this atom against `metadata`.
    ///
    /// # Errors
    /// Only time directives can fail, with [`ErrorKind::MissingDate`], when the
    /// metadata has no capture date.
    pub fn resolve(&self, metadata: &Metadata) -> Result<Resolution> {
        Ok(match self {
            Atom::Literal(text) => Resolution::Resolved(text.clone()),
            Atom::Time(directive) => {
                let date = metadata.date_taken.ok_or_raise(|| ErrorKind::MissingDate)?;
                let mut formatted = String::new();
                if write!(formatted, "{}", date.format(directive)).is_err() {
                    // Directives needing a timezone (`%z`) cannot format a naive
                    // date; leave them as written.
                    formatted = directive.clone();
                }
                Resolution::Resolved(formatted)
            },
            Atom::Field(field) => field.resolve(metadata),
        })
    }
}

impl Field {
    fn resolve(&self, metadata: &Metadata) -> Resolution {
        let value = match self {
            Field::Location(scope) => match metadata.coordinates {
                None => Err(Sentinel::NoGps),
                Some(_) => metadata.place_name(*scope).map(str::to_string).ok_or(Sentinel::UnknownLocation),
            },
            Field::CameraMake => present(&metadata.camera_make).ok_or(Sentinel::NoCameraInfo),
            Field::CameraModel => present(&metadata.camera_model).ok_or(Sentinel::NoCameraInfo),
            Field::Album => present(&metadata.album).ok_or(Sentinel::Missing),
            Field::Title => present(&metadata.title).ok_or(Sentinel::Missing),
            Field::BaseName => present(&metadata.base_name).ok_or(Sentinel::Missing),
            Field::Extension => non_empty(&metadata.extension)
                .map(|e| e.trim_start_matches('.'))
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .ok_or(Sentinel::Missing),
            Field::OriginalName => original_name(metadata).ok_or(Sentinel::Missing),
            Field::Unknown(name) => {
                tracing::trace!(name = name.as_str(), "Template references an unknown field");
                Err(Sentinel::Missing)
            },
        };
        // Metadata must not be able to introduce directories of its own.
        match value.map(|v| v.replace(['/', '\\'], "-")) {
            // `.` and `..` would navigate instead of naming a directory.
            Ok(value) if value.trim_matches('.').is_empty() => Resolution::Sentinel(self.absent()),
            Ok(value) => Resolution::Resolved(value),
            Err(sentinel) => Resolution::Sentinel(sentinel),
        }
    }

    /// The sentinel for a value that is present but unusable.
    fn absent(&self) -> Sentinel {
        match self {
            Field::Location(_) => Sentinel::UnknownLocation,
            Field::CameraMake | Field::CameraModel => Sentinel::NoCameraInfo,
            _ => Sentinel::Missing,
        }
    }
}

fn present(value: &Option<String>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The name the media was first imported under, without its extension.
///
/// Falls back to the current base name with any `YYYY-MM-DD_HH-MM-SS-` prefix
/// (added by earlier imports) removed, so re-importing an organized file does
/// not stack date prefixes.
fn original_name(metadata: &Metadata) -> Option<String> {
    if let Some(original) = non_empty(&metadata.original_name) {
        let stem = Path::new(original).file_stem().map(|s| s.to_string_lossy().into_owned());
        return stem.filter(|s| !s.is_empty()).or_else(|| Some(original.to_string()));
    }
    let base = non_empty(&metadata.base_name)?;
    match DATED_NAME_PREFIX.replace(base, "") {
        stripped if stripped.is_empty() => Some(base.to_string()),
        stripped => Some(stripped.into_owned()),
    }
}

fn closing_bracket(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

/// A rendered candidate, component or alternative.
struct Rendered<T> {
    value: T,
    /// `false` when a sentinel remains somewhere inside.
    accepted: bool,
}

enum Piece<'a> {
    Literal(&'a str),
    Value(String),
    /// A [`Sentinel::Missing`] atom, which takes adjacent punctuation with it.
    Dropped,
}

impl Candidate {
    fn render(&self, metadata: &Metadata) -> Result<Rendered<String>> {
        let mut accepted = true;
        let mut pieces = Vec::with_capacity(self.atoms.len());
        for atom in &self.atoms {
            pieces.push(match (atom, atom.resolve(metadata)?) {
                (Atom::Literal(text), _) => Piece::Literal(text),
                (_, Resolution::Resolved(value)) => Piece::Value(value),
                (_, Resolution::Sentinel(Sentinel::Missing)) => {
                    accepted = false;
                    Piece::Dropped
                },
                (_, Resolution::Sentinel(sentinel)) => {
                    accepted = false;
                    Piece::Value(sentinel.to_string())
                },
            });
        }
        // `%date-%title` without a title renders as `<date>`, not `<date>-`.
        for i in 0..pieces.len() {
            if !matches!(pieces[i], Piece::Dropped) {
                continue;
            }
            let is_separator = |c: char| !c.is_alphanumeric();
            let mut closers = Vec::new();
            if let Some(Piece::Literal(before)) = i.checked_sub(1).map(|j| &mut pieces[j]) {
                let text = *before;
                let trimmed = text.trim_end_matches(is_separator);
                closers.extend(text[trimmed.len()..].chars().rev().filter_map(closing_bracket));
                *before = trimmed;
            } else if let Some(Piece::Literal(after)) = pieces.get_mut(i + 1) {
                *after = after.trim_start_matches(is_separator);
            }
            // `%Y (%title)` loses both brackets.
            if let Some(Piece::Literal(after)) = pieces.get_mut(i + 1) {
                for closer in closers {
                    match after.strip_prefix(closer) {
                        Some(rest) => *after = rest,
                        None => break,
                    }
                }
            }
        }
        let mut value = String::new();
        for piece in &pieces {
            match piece {
                Piece::Literal(text) => value.push_str(text),
                Piece::Value(text) => value.push_str(text),
                Piece::Dropped => {},
            }
        }
        Ok(Rendered { value, accepted })
    }
}

impl Component {
    fn render(&self, metadata: &Metadata) -> Result<Rendered<String>> {
        let mut last = Rendered { value: String::new(), accepted: true };
        for candidate in &self.candidates {
            last = candidate.render(metadata)?;
            if last.accepted {
                break;
            }
        }
        last.value = last.value.trim().to_string();
        Ok(last)
    }
}

impl Alternative {
    fn render(&self, metadata: &Metadata) -> Result<Rendered<Vec<String>>> {
        let mut accepted = true;
        let mut components = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let rendered = component.render(metadata)?;
            accepted &= rendered.accepted;
            if !rendered.value.is_empty() {
                components.push(rendered.value);
            }
        }
        Ok(Rendered { value: components, accepted })
    }
}

impl Pattern {
    /// Resolves the pattern into its non-empty, trimmed path components.
    ///
    /// Never fails because of missing metadata; see the [module](self)
    /// documentation for the fallback rules.
    ///
    /// # Errors
    /// [`ErrorKind::MissingDate`] when a time directive has to be rendered for
    /// metadata without a capture date.
    pub fn resolve(&self, metadata: &Metadata) -> Result<Vec<String>> {
        let mut last = Vec::new();
        for alternative in &self.alternatives {
            let rendered = alternative.render(metadata)?;
            if rendered.accepted {
                return Ok(rendered.value);
            }
            last = rendered.value;
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Coordinates, Place};
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> Option<chrono::NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(12, 42, 34))
    }

    fn gps() -> Option<Coordinates> {
        Some(Coordinates { latitude: 54.9286804166667, longitude: -2.94800427777778 })
    }

    /// Carlisle, Cumbria: no village, no hamlet.
    fn carlisle() -> Metadata {
        Metadata {
            date_taken: date(2017, 12, 7),
            coordinates: gps(),
            place: Some(Place {
                city: Some("Carlisle".into()),
                county: Some("Cumbria".into()),
                state: Some("England".into()),
                country: Some("UK".into()),
                default: Some("Carlisle".into()),
                ..Place::default()
            }),
            ..Metadata::default()
        }
    }

    fn no_gps() -> Metadata {
        Metadata { date_taken: date(2017, 12, 7), ..Metadata::default() }
    }

    fn resolve(template: &str, templates: &[(&str, &str)], metadata: &Metadata) -> String {
        let templates = templates.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>();
        Pattern::compile(template, &templates).unwrap().resolve(metadata).unwrap().join("/")
    }

    const YEAR_MONTH: &[(&str, &str)] = &[("year", "%Y"), ("month", "%B")];

    #[rstest]
    #[case("${year}/${month}", "2017/December")]
    #[case("%country/%city/${year}/${month}", "UK/Carlisle/2017/December")]
    #[case("%country/%village/${year}/${month}", "UK/UNKNOWN LOCATION/2017/December")]
    #[case("%country/%city/%\"TEXT\"/${year}/${month}", "UK/Carlisle/TEXT/2017/December")]
    #[case("%village/%city/${year}/${month} | %country/%county/${year}/${month}", "UK/Cumbria/2017/December")]
    #[case("%country/%city/${year}/${month} | %village/%city/${year}/${month}", "UK/Carlisle/2017/December")]
    #[case("%country/%hamlet | %village/%city | %village/${year}", "UNKNOWN LOCATION/2017")]
    #[case("%country/%city|%county|%village", "UK/Carlisle")]
    #[case("%location", "Carlisle")]
    fn test_with_gps(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(resolve(template, YEAR_MONTH, &carlisle()), expected);
    }

    #[test]
    fn test_county_fallback() {
        let mut metadata = carlisle();
        if let Some(place) = metadata.place.as_mut() {
            place.city = None;
        }
        assert_eq!(resolve("%country/%city|%county|%village", &[], &metadata), "UK/Cumbria");
    }

    #[test]
    fn test_fallback_does_not_blend_alternatives() {
        assert_eq!(resolve("%village/%city | %country/%county", &[], &carlisle()), "UK/Cumbria");
    }

    #[test]
    fn test_no_gps_placeholder() {
        let template = "%country/%city/${year}/${month} | %village/%city/${year}/${month} | %country/${year}/${month}";
        assert_eq!(resolve(template, YEAR_MONTH, &no_gps()), "NO GPS/2017/December");
    }

    #[rstest]
    #[case("%city")]
    #[case("%hamlet")]
    #[case("%location")]
    fn test_gps_determines_sentinel(#[case] template: &str) {
        assert_eq!(resolve(template, &[], &no_gps()), "NO GPS");
        let unresolved = Metadata { coordinates: gps(), ..no_gps() };
        assert_eq!(resolve(template, &[], &unresolved), "UNKNOWN LOCATION");
    }

    #[test]
    fn test_literal_outranks_sentinel() {
        assert_eq!(resolve(r#"%city|"Unknown Location""#, &[], &no_gps()), "Unknown Location");
    }

    #[test]
    fn test_no_camera_fallback() {
        assert_eq!(resolve(r#"%camera_make|"nomake"/%camera_model|"nomodel""#, &[], &no_gps()), "nomake/nomodel");
        assert_eq!(resolve("%camera_make/%camera_model", &[], &no_gps()), "NO CAMERA INFO/NO CAMERA INFO");
        let canon = Metadata { camera_make: Some("Canon".into()), camera_model: Some("EOS 5D".into()), ..no_gps() };
        assert_eq!(resolve(r#"%camera_make|"nomake"/%camera_model|"nomodel""#, &[], &canon), "Canon/EOS 5D");
    }

    #[test]
    fn test_default_folder_scenario() {
        let metadata = Metadata {
            date_taken: date(2015, 12, 24),
            coordinates: gps(),
            place: Some(Place { city: Some("Sunnyvale".into()), ..Place::default() }),
            ..Metadata::default()
        };
        let templates = [("date", "%Y-%m-%b"), ("location", "%city")];
        let template = r#"%date/%album|%location|"Unknown Location""#;
        assert_eq!(resolve(template, &templates, &metadata), "2015-12-Dec/Sunnyvale");
        let with_album = Metadata { album: Some("Christmas".into()), ..metadata };
        assert_eq!(resolve(template, &templates, &with_album), "2015-12-Dec/Christmas");
    }

    #[test]
    fn test_pure_literal_round_trip() {
        assert_eq!(resolve("photos/archive", &[], &Metadata::default()), "photos/archive");
        assert_eq!(resolve(r#""photos"/%"archive-2""#, &[], &Metadata::default()), "photos/archive-2");
    }

    #[test]
    fn test_missing_field_drops_separator() {
        let template = "%Y-%title-%original_name";
        let metadata = Metadata { original_name: Some("IMG_0001.JPG".into()), ..no_gps() };
        assert_eq!(resolve(template, &[], &metadata), "2017-IMG_0001");
        assert_eq!(resolve("%title-%Y", &[], &no_gps()), "2017");
    }

    #[test]
    fn test_missing_final_fallback_empties_component() {
        assert_eq!(resolve("%Y/%album/%m", &[], &no_gps()), "2017/12");
    }

    #[test]
    fn test_unknown_field_is_missing() {
        assert_eq!(resolve("%Y/%lens|%m", &[], &no_gps()), "2017/12");
    }

    #[test]
    fn test_field_values_cannot_add_directories() {
        let metadata = Metadata { album: Some("2019/Trip".into()), ..no_gps() };
        assert_eq!(resolve("%album", &[], &metadata), "2019-Trip");
    }

    #[rstest]
    #[case("%Y/%m/%album", "..", "2017/12")]
    #[case("%album/%Y", "..", "2017")]
    #[case(r#"%album|"Unknown"/%Y"#, ".", "Unknown/2017")]
    #[case("%Y/%album", "...", "2017")]
    #[case("%Y/%album", "a..b", "2017/a..b")]
    #[case("%Y/%album", "../x", "2017/..-x")]
    fn test_dot_values_are_names(#[case] template: &str, #[case] album: &str, #[case] expected: &str) {
        let metadata = Metadata { album: Some(album.into()), ..no_gps() };
        assert_eq!(resolve(template, &[], &metadata), expected);
    }

    #[test]
    fn test_dot_place_is_unknown_location() {
        let metadata = Metadata {
            coordinates: gps(),
            place: Some(Place { city: Some("..".into()), ..Place::default() }),
            ..no_gps()
        };
        assert_eq!(resolve("%city/%Y", &[], &metadata), "UNKNOWN LOCATION/2017");
    }

    #[rstest]
    #[case("%Y (%title)", None, "2017")]
    #[case("%Y [%title] x", None, "2017 x")]
    #[case("(%title) %Y", None, "2017")]
    #[case("%Y (%title)", Some("Trip"), "2017 (Trip)")]
    #[case("%Y-%title.%m", None, "2017.12")]
    fn test_missing_field_drops_brackets(#[case] template: &str, #[case] title: Option<&str>, #[case] expected: &str) {
        let metadata = Metadata { title: title.map(String::from), ..no_gps() };
        assert_eq!(resolve(template, &[], &metadata), expected);
    }

    #[test]
    fn test_directive_followed_by_letters_needs_quotes() {
        // A lowercase run after `%` is read as a field name.
        assert_eq!(resolve("%Y/%dth", &[], &no_gps()), "2017");
        assert_eq!(resolve(r#"%Y/%d"th""#, &[], &no_gps()), "2017/07th");
    }

    #[test]
    fn test_short_circuit_skips_later_candidates() {
        // The second candidate would need a date; it must never be evaluated.
        let metadata = Metadata { album: Some("Trip".into()), ..Metadata::default() };
        assert_eq!(resolve("%album|%Y", &[], &metadata), "Trip");
    }

    #[test]
    fn test_missing_date_is_an_error() {
        let pattern: Pattern = "%Y/%m".parse().unwrap();
        let err = pattern.resolve(&Metadata::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingDate);
    }

    #[test]
    fn test_timezone_directive_is_left_verbatim() {
        assert_eq!(resolve("%Y%z", &[], &no_gps()), "2017%z");
    }

    #[rstest]
    #[case(Some("IMG_0001.JPG"), None, "IMG_0001")]
    #[case(None, Some("2015-12-24_10-30-00-IMG_0001"), "IMG_0001")]
    #[case(None, Some("2015-12-24_10-30-00-"), "2015-12-24_10-30-00-")]
    #[case(None, Some("holiday"), "holiday")]
    fn test_original_name(#[case] original: Option<&str>, #[case] base: Option<&str>, #[case] expected: &str) {
        let metadata = Metadata {
            original_name: original.map(String::from),
            base_name: base.map(String::from),
            ..Metadata::default()
        };
        assert_eq!(Field::OriginalName.resolve(&metadata), Resolution::Resolved(expected.to_string()));
    }

    #[test]
    fn test_atom_resolution_is_tagged() {
        let metadata = no_gps();
        assert_eq!(Atom::Field(Field::Album).resolve(&metadata).unwrap(), Resolution::Sentinel(Sentinel::Missing));
        assert_eq!(
            Atom::Field(Field::CameraModel).resolve(&metadata).unwrap(),
            Resolution::Sentinel(Sentinel::NoCameraInfo)
        );
        assert_eq!(Atom::Time("%d".into()).resolve(&metadata).unwrap(), Resolution::Resolved("07".into()));
    }
}
