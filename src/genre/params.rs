//! Parameter sets and the session's live parameter values.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{GenreCatalog, GenreSelector};

/// Mapping from parameter id to numeric value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: BTreeMap<String, f32>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.values.get(id).copied()
    }

    pub fn set(&mut self, id: impl Into<String>, value: f32) {
        self.values.insert(id.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Default)]
struct LiveState {
    genre: Option<GenreSelector>,
    values: ParameterSet,
}

/// The session's active genre and its most recent parameter values.
///
/// Written by the UI layer, read by the acquisition coordinator at dispatch
/// time. Cloning yields another handle onto the same state.
#[derive(Debug, Clone)]
pub struct LiveParameters {
    state: Arc<RwLock<LiveState>>,
    catalog: Arc<GenreCatalog>,
}

impl LiveParameters {
    pub fn new(catalog: Arc<GenreCatalog>) -> Self {
        Self {
            state: Arc::new(RwLock::new(LiveState::default())),
            catalog,
        }
    }

    pub fn catalog(&self) -> &GenreCatalog {
        &self.catalog
    }

    /// Make `genre` the active genre, seeding its values from the catalog defaults.
    ///
    /// Re-selecting the already active genre keeps the current values.
    pub fn set_active_genre(&self, genre: GenreSelector) {
        let mut state = self.state.write();
        if state.genre.as_ref() == Some(&genre) {
            return;
        }
        state.values = self.catalog.defaults(&genre);
        state.genre = Some(genre);
    }

    pub fn active_genre(&self) -> Option<GenreSelector> {
        self.state.read().genre.clone()
    }

    pub fn is_active(&self, genre: &GenreSelector) -> bool {
        self.state.read().genre.as_ref() == Some(genre)
    }

    /// Update one parameter of the active genre.
    ///
    /// The value is clamped when the active genre defines the parameter.
    pub fn set_param(&self, id: &str, value: f32) {
        let mut state = self.state.write();
        let value = state
            .genre
            .as_ref()
            .and_then(|g| self.catalog.find(g))
            .and_then(|def| def.param(id))
            .map(|p| p.clamp(value))
            .unwrap_or(value);
        state.values.set(id, value);
    }

    /// Current values for the active genre.
    pub fn snapshot(&self) -> ParameterSet {
        self.state.read().values.clone()
    }

    /// Parameter set to send for a request targeting `genre`.
    ///
    /// The active genre gets its live values as of this call; any other
    /// genre falls back to its first `base_count` parameters at defaults.
    pub fn effective_for(&self, genre: &GenreSelector, base_count: usize) -> ParameterSet {
        let state = self.state.read();
        if state.genre.as_ref() == Some(genre) {
            state.values.clone()
        } else {
            self.catalog.base_params(genre, base_count)
        }
    }
}
