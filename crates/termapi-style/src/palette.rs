#![forbid(unsafe_code)]

//! Keyed color palettes.
//!
//! A palette maps application-defined keys to [`SetColor`] values so a
//! program can color output consistently, and switch all of it off at once:
//! while a palette is inactive every lookup yields the placeholder setter.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::set_color::SetColor;

/// Palette lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteError {
    /// The key has no color assigned.
    MissingKey,
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey => write!(f, "palette key not found"),
        }
    }
}

impl std::error::Error for PaletteError {}

/// Key → color setter map with an on/off switch.
#[derive(Debug, Clone)]
pub struct ColorPalette<K> {
    entries: HashMap<K, SetColor>,
    active: bool,
    placeholder: SetColor,
}

impl<K: Eq + Hash> Default for ColorPalette<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> ColorPalette<K> {
    /// An empty, active palette.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            active: true,
            placeholder: SetColor::placeholder(),
        }
    }

    /// Assign a color to `key`, returning the one it replaces.
    pub fn insert(&mut self, key: K, color: impl Into<SetColor>) -> Option<SetColor> {
        self.entries.insert(key, color.into())
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// The setter for `key`, or the placeholder while the palette is
    /// inactive.
    ///
    /// Unknown keys fail even while inactive.
    pub fn get(&self, key: &K) -> Result<&SetColor, PaletteError> {
        let color = self.entries.get(key).ok_or(PaletteError::MissingKey)?;
        Ok(if self.active { color } else { &self.placeholder })
    }

    /// Enable or disable color output; returns the previous state.
    pub fn set_active(&mut self, active: bool) -> bool {
        let previous = std::mem::replace(&mut self.active, active);
        if previous != active {
            termapi_core::debug!(active, "color palette toggled");
        }
        previous
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, C: Into<SetColor>> FromIterator<(K, C)> for ColorPalette<K> {
    fn from_iter<T: IntoIterator<Item = (K, C)>>(iter: T) -> Self {
        let mut palette = Self::new();
        for (key, color) in iter {
            palette.insert(key, color);
        }
        palette
    }
}
