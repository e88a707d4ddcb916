//! Genre selection and the built-in genre catalog.
//!
//! A [`GenreSelector`] is the acquisition key: every track request, every
//! prefetch and every staged `next` track is tied to exactly one selector.
//! The [`GenreCatalog`] describes the tone-shaping parameters each known
//! genre exposes, and which of them count as "base" parameters for
//! cross-genre requests.

mod params;

pub use params::{LiveParameters, ParameterSet};

use std::fmt;

/// Identifies the musical genre a track was (or should be) acquired for.
///
/// Immutable once created; switching genre means replacing the selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenreSelector {
    label: String,
}

impl GenreSelector {
    /// Create a selector from a free-text label (surrounding whitespace is trimmed).
    pub fn new(label: impl Into<String>) -> Self {
        let label: String = label.into();
        Self {
            label: label.trim().to_string(),
        }
    }

    /// The label as shown to the user.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Case-insensitive comparison against a catalog label.
    pub fn matches(&self, label: &str) -> bool {
        self.label.eq_ignore_ascii_case(label.trim())
    }
}

impl fmt::Display for GenreSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A single tone-shaping knob exposed by a genre.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDef {
    pub id: &'static str,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParameterDef {
    const fn new(id: &'static str, label: &'static str, default: f32) -> Self {
        Self {
            id,
            label,
            min: 0.0,
            max: 100.0,
            default,
        }
    }

    /// Clamp a value into this parameter's range.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Catalog entry for a known genre.
#[derive(Debug, Clone)]
pub struct GenreDefinition {
    pub label: &'static str,
    /// Phrase sent to the provider instead of the raw label
    pub search_phrase: &'static str,
    /// Parameters in display order; the first few are the base parameters
    pub params: Vec<ParameterDef>,
}

impl GenreDefinition {
    /// All parameters at their default values.
    pub fn defaults(&self) -> ParameterSet {
        self.params.iter().map(|p| (p.id, p.default)).collect()
    }

    /// The first `count` parameters at their default values.
    pub fn base_params(&self, count: usize) -> ParameterSet {
        self.params
            .iter()
            .take(count)
            .map(|p| (p.id, p.default))
            .collect()
    }

    /// Look up a parameter definition by id.
    pub fn param(&self, id: &str) -> Option<&ParameterDef> {
        self.params.iter().find(|p| p.id == id)
    }
}

/// The set of genres the application knows how to shape.
///
/// Unknown genres are still valid acquisition keys; they simply have no
/// parameters and are searched by their raw label.
#[derive(Debug, Clone)]
pub struct GenreCatalog {
    genres: Vec<GenreDefinition>,
}

impl GenreCatalog {
    /// Create a catalog from explicit definitions.
    pub fn new(genres: Vec<GenreDefinition>) -> Self {
        Self { genres }
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        use ParameterDef as P;

        Self::new(vec![
            GenreDefinition {
                label: "Lo-Fi Beats",
                search_phrase: "lofi hip hop beat",
                params: vec![
                    P::new("warmth", "Warmth", 70.0),
                    P::new("vinyl", "Vinyl Crackle", 40.0),
                    P::new("tempo", "Tempo", 45.0),
                    P::new("reverb", "Reverb", 30.0),
                    P::new("swing", "Swing", 55.0),
                ],
            },
            GenreDefinition {
                label: "Ambient",
                search_phrase: "ambient drone pad",
                params: vec![
                    P::new("space", "Space", 80.0),
                    P::new("brightness", "Brightness", 35.0),
                    P::new("movement", "Movement", 20.0),
                    P::new("texture", "Texture", 50.0),
                ],
            },
            GenreDefinition {
                label: "Synthwave",
                search_phrase: "synthwave retro synth",
                params: vec![
                    P::new("drive", "Drive", 60.0),
                    P::new("tempo", "Tempo", 65.0),
                    P::new("chorus", "Chorus", 50.0),
                    P::new("gated_reverb", "Gated Reverb", 45.0),
                ],
            },
            GenreDefinition {
                label: "Jazz",
                search_phrase: "jazz trio",
                params: vec![
                    P::new("swing", "Swing", 65.0),
                    P::new("tempo", "Tempo", 50.0),
                    P::new("brush", "Brush Kit", 40.0),
                    P::new("room", "Room", 35.0),
                ],
            },
            GenreDefinition {
                label: "Classical Piano",
                search_phrase: "piano classical",
                params: vec![
                    P::new("dynamics", "Dynamics", 60.0),
                    P::new("tempo", "Tempo", 40.0),
                    P::new("hall", "Hall", 55.0),
                ],
            },
            GenreDefinition {
                label: "Drum & Bass",
                search_phrase: "drum and bass",
                params: vec![
                    P::new("tempo", "Tempo", 85.0),
                    P::new("sub", "Sub Bass", 75.0),
                    P::new("break", "Break Intensity", 70.0),
                    P::new("atmosphere", "Atmosphere", 30.0),
                ],
            },
            GenreDefinition {
                label: "Chillhop",
                search_phrase: "chillhop",
                params: vec![
                    P::new("warmth", "Warmth", 60.0),
                    P::new("tempo", "Tempo", 50.0),
                    P::new("keys", "Keys", 55.0),
                    P::new("vinyl", "Vinyl Crackle", 25.0),
                ],
            },
            GenreDefinition {
                label: "Deep House",
                search_phrase: "deep house groove",
                params: vec![
                    P::new("tempo", "Tempo", 60.0),
                    P::new("groove", "Groove", 65.0),
                    P::new("filter", "Filter", 45.0),
                    P::new("pad", "Pads", 40.0),
                ],
            },
        ])
    }

    /// Find the catalog entry for a selector (case-insensitive).
    pub fn find(&self, genre: &GenreSelector) -> Option<&GenreDefinition> {
        self.genres.iter().find(|g| genre.matches(g.label))
    }

    /// Phrase to search the provider with for this genre.
    pub fn search_phrase<'a>(&'a self, genre: &'a GenreSelector) -> &'a str {
        self.find(genre)
            .map(|g| g.search_phrase)
            .unwrap_or_else(|| genre.label())
    }

    /// The genre's first `count` parameters at their defaults (empty for unknown genres).
    pub fn base_params(&self, genre: &GenreSelector, count: usize) -> ParameterSet {
        self.find(genre)
            .map(|g| g.base_params(count))
            .unwrap_or_default()
    }

    /// All of the genre's parameters at their defaults (empty for unknown genres).
    pub fn defaults(&self, genre: &GenreSelector) -> ParameterSet {
        self.find(genre).map(|g| g.defaults()).unwrap_or_default()
    }

    /// Iterate over all catalog entries.
    pub fn iter(&self) -> impl Iterator<Item = &GenreDefinition> {
        self.genres.iter()
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

impl Default for GenreCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
