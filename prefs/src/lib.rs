//! Shared preference model for the theme / tile-style sync protocol.
//!
//! This crate owns the value types and the sync logic used by both `server`
//! and `client`. It has no browser dependency: the document, device-local
//! storage and the persistence transport are reached through traits, so the
//! same coordinator drives `web-sys` in the browser and in-memory fakes in
//! tests.
//!
//! DESIGN
//! ======
//! Two closed enumerations ([`ColorPalette`], [`TileStyle`]) are the only
//! values that flow through the protocol. Everything that needs to name one
//! of them on the wire, in the DOM, or in local storage goes through
//! [`PreferenceKind`] so the string contracts live in one place.

pub mod dom;
pub mod reflector;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use store::{KeyValueStore, MemoryStore, PreferenceStore, StoreError};
pub use sync::{FailureReason, MigrationOutcome, PersistOutcome, PreferenceTransport, SyncCoordinator};

/// Error returned when a raw string does not name a known preference value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown color palette: {0:?}")]
    UnknownPalette(String),
    #[error("unknown tile style: {0:?}")]
    UnknownTileStyle(String),
}

/// Error returned by [`PreferenceForm::encode`].
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("failed to encode preference form: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

// =============================================================================
// VALUES
// =============================================================================

/// Named color theme applied to the whole document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorPalette {
    #[default]
    RefinedPrun,
    PrunDefault,
    HighContrast,
    Monochrome,
}

impl ColorPalette {
    pub const ALL: [Self; 4] = [Self::RefinedPrun, Self::PrunDefault, Self::HighContrast, Self::Monochrome];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RefinedPrun => "refined-prun",
            Self::PrunDefault => "prun-default",
            Self::HighContrast => "high-contrast",
            Self::Monochrome => "monochrome",
        }
    }
}

impl FromStr for ColorPalette {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == raw)
            .ok_or_else(|| ParseError::UnknownPalette(raw.to_owned()))
    }
}

impl fmt::Display for ColorPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering mode for material tiles and category chips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileStyle {
    #[default]
    Filled,
    Lite,
}

impl TileStyle {
    pub const ALL: [Self; 2] = [Self::Filled, Self::Lite];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filled => "filled",
            Self::Lite => "lite",
        }
    }
}

impl FromStr for TileStyle {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == raw)
            .ok_or_else(|| ParseError::UnknownTileStyle(raw.to_owned()))
    }
}

impl fmt::Display for TileStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// KINDS
// =============================================================================

/// Which of the two preferences a value, key, or attribute refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PreferenceKind {
    Palette,
    TileStyle,
}

impl PreferenceKind {
    pub const ALL: [Self; 2] = [Self::Palette, Self::TileStyle];

    /// Attribute on the root element holding the active value.
    #[must_use]
    pub fn root_attribute(self) -> &'static str {
        match self {
            Self::Palette => "data-theme",
            Self::TileStyle => "data-tile-style",
        }
    }

    /// Form field name on the persistence endpoint.
    #[must_use]
    pub fn form_field(self) -> &'static str {
        match self {
            Self::Palette => "color_palette",
            Self::TileStyle => "tile_style",
        }
    }

    /// Device-local storage key for the anonymous fallback copy.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Palette => "pru-color-palette",
            Self::TileStyle => "pru-tile-style",
        }
    }

    /// Attribute carried by the choice controls of a settings surface.
    #[must_use]
    pub fn choice_attribute(self) -> &'static str {
        match self {
            Self::Palette => "data-theme-choice",
            Self::TileStyle => "data-tile-style-choice",
        }
    }
}

impl fmt::Display for PreferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_field())
    }
}

/// A single preference value tagged with its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preference {
    Palette(ColorPalette),
    TileStyle(TileStyle),
}

impl Preference {
    #[must_use]
    pub fn kind(self) -> PreferenceKind {
        match self {
            Self::Palette(_) => PreferenceKind::Palette,
            Self::TileStyle(_) => PreferenceKind::TileStyle,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Palette(p) => p.as_str(),
            Self::TileStyle(s) => s.as_str(),
        }
    }

    /// Fixed default applied when no value exists for `kind`.
    #[must_use]
    pub fn default_for(kind: PreferenceKind) -> Self {
        match kind {
            PreferenceKind::Palette => Self::Palette(ColorPalette::default()),
            PreferenceKind::TileStyle => Self::TileStyle(TileStyle::default()),
        }
    }

    /// Parse a raw string as a value of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when `raw` is not a member of the kind's domain.
    pub fn parse(kind: PreferenceKind, raw: &str) -> Result<Self, ParseError> {
        match kind {
            PreferenceKind::Palette => raw.parse().map(Self::Palette),
            PreferenceKind::TileStyle => raw.parse().map(Self::TileStyle),
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pair of values active for one document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePreferences {
    pub color_palette: ColorPalette,
    pub tile_style: TileStyle,
}

impl ActivePreferences {
    #[must_use]
    pub fn get(&self, kind: PreferenceKind) -> Preference {
        match kind {
            PreferenceKind::Palette => Preference::Palette(self.color_palette),
            PreferenceKind::TileStyle => Preference::TileStyle(self.tile_style),
        }
    }

    #[must_use]
    pub fn with(mut self, value: Preference) -> Self {
        match value {
            Preference::Palette(p) => self.color_palette = p,
            Preference::TileStyle(s) => self.tile_style = s,
        }
        self
    }
}

// =============================================================================
// WIRE FORM
// =============================================================================

/// Form-encoded body accepted by the persistence endpoint.
///
/// Absent fields are omitted from the encoding so a single-kind update never
/// touches the other stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<ColorPalette>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_style: Option<TileStyle>,
    #[serde(default)]
    pub csrf_token: String,
}

impl PreferenceForm {
    #[must_use]
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self { color_palette: None, tile_style: None, csrf_token: csrf_token.into() }
    }

    #[must_use]
    pub fn with(mut self, value: Preference) -> Self {
        match value {
            Preference::Palette(p) => self.color_palette = Some(p),
            Preference::TileStyle(s) => self.tile_style = Some(s),
        }
        self
    }

    /// Values carried by this form, palette first.
    #[must_use]
    pub fn values(&self) -> Vec<Preference> {
        let mut out = Vec::with_capacity(2);
        if let Some(p) = self.color_palette {
            out.push(Preference::Palette(p));
        }
        if let Some(s) = self.tile_style {
            out.push(Preference::TileStyle(s));
        }
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.color_palette.is_none() && self.tile_style.is_none()
    }

    /// Encode as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Encode`] if serialization fails.
    pub fn encode(&self) -> Result<String, FormError> {
        Ok(serde_urlencoded::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
