//! Per-file facts consumed by the template engine.
//!
//! Extraction of these facts (EXIF, sidecars, reverse geocoding) happens
//! elsewhere; this module only defines the shape the engine reads from.

use chrono::NaiveDateTime;

/// A GPS position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Granularity of a resolved place name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Hamlet,
    Village,
    Town,
    City,
    County,
    State,
    Country,
    /// The most specific name the geocoder could find, whatever its scope.
    Default,
}

/// Place names resolved for a pair of [`Coordinates`].
///
/// Every scope is optional: a rural photo may resolve a county and a country
/// but no city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
    pub hamlet: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub default: Option<String>,
}
impl Place {
    /// Returns the non-empty name for `scope`, if one was resolved.
    pub fn get(&self, scope: Scope) -> Option<&str> {
        let name = match scope {
            Scope::Hamlet => &self.hamlet,
            Scope::Village => &self.village,
            Scope::Town => &self.town,
            Scope::City => &self.city,
            Scope::County => &self.county,
            Scope::State => &self.state,
            Scope::Country => &self.country,
            Scope::Default => &self.default,
        };
        name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Reverse geocoder seam.
///
/// Returns `None` when nothing at all could be resolved for the position, which
/// the resolver reports as `UNKNOWN LOCATION` (GPS present, place unknown).
pub trait PlaceResolver {
    fn resolve(&self, coordinates: Coordinates) -> Option<Place>;
}

/// Metadata of a single photo or video, as far as path templating cares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub date_taken: Option<NaiveDateTime>,
    pub coordinates: Option<Coordinates>,
    pub place: Option<Place>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    /// File name the media had when it was first imported, extension included.
    pub original_name: Option<String>,
    /// Current file name without its extension.
    pub base_name: Option<String>,
    /// Extension without the leading dot.
    pub extension: Option<String>,
}
impl Metadata {
    /// Fills [`place`](Self::place) using `resolver`.
    ///
    /// Without coordinates this clears any place that was set, keeping "no GPS"
    /// and "unknown location" distinguishable.
    pub fn locate(&mut self, resolver: &impl PlaceResolver) {
        self.place = self.coordinates.and_then(|c| resolver.resolve(c));
    }

    /// The place name for `scope` when GPS data is present.
    pub(crate) fn place_name(&self, scope: Scope) -> Option<&str> {
        self.coordinates?;
        self.place.as_ref()?.get(scope)
    }
}
