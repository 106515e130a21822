//! Stored theme preferences for signed-in users.
//!
//! DESIGN
//! ======
//! The `users.color_palette` / `users.tile_style` columns are nullable, NULL
//! meaning "use the default". Updates are partial: a kind absent from the
//! request keeps its stored value.
//!
//! Raw column text is resolved into typed values only at the edge, so a row
//! written by an older build with a value that no longer exists falls back
//! to the default instead of failing the page.

use async_trait::async_trait;
use prefs::{ActivePreferences, ColorPalette, Preference, PreferenceKind, TileStyle};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("no preference values supplied")]
    Empty,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Column values exactly as stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredPreferences {
    pub color_palette: Option<String>,
    pub tile_style: Option<String>,
}

impl StoredPreferences {
    fn raw(&self, kind: PreferenceKind) -> Option<&str> {
        match kind {
            PreferenceKind::Palette => self.color_palette.as_deref(),
            PreferenceKind::TileStyle => self.tile_style.as_deref(),
        }
    }

    /// Typed values, substituting defaults for NULL or unknown text.
    #[must_use]
    pub fn resolve(&self) -> ActivePreferences {
        PreferenceKind::ALL.into_iter().fold(ActivePreferences::default(), |active, kind| {
            let Some(raw) = self.raw(kind) else {
                return active;
            };
            match Preference::parse(kind, raw) {
                Ok(value) => active.with(value),
                Err(e) => {
                    tracing::warn!(error = %e, %kind, "stored preference unreadable, using default");
                    active
                }
            }
        })
    }
}

/// A partial update; `None` leaves the column untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreferenceUpdate {
    pub color_palette: Option<ColorPalette>,
    pub tile_style: Option<TileStyle>,
}

impl PreferenceUpdate {
    #[must_use]
    pub fn from_values(values: &[Preference]) -> Self {
        values.iter().fold(Self::default(), |mut update, value| {
            match *value {
                Preference::Palette(p) => update.color_palette = Some(p),
                Preference::TileStyle(s) => update.tile_style = Some(s),
            }
            update
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.color_palette.is_none() && self.tile_style.is_none()
    }
}

#[async_trait]
pub trait PreferenceRepo: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<StoredPreferences, PreferenceError>;

    /// # Errors
    ///
    /// Implementations return [`PreferenceError::Empty`] for an empty update.
    async fn save(&self, user_id: Uuid, update: PreferenceUpdate) -> Result<(), PreferenceError>;
}

/// `PreferenceRepo` over the `users` table.
#[derive(Clone)]
pub struct PgPreferenceRepo {
    pool: PgPool,
}

impl PgPreferenceRepo {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceRepo for PgPreferenceRepo {
    async fn load(&self, user_id: Uuid) -> Result<StoredPreferences, PreferenceError> {
        let row = sqlx::query("SELECT color_palette, tile_style FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(PreferenceError::UserNotFound(user_id))?;

        Ok(StoredPreferences { color_palette: row.get("color_palette"), tile_style: row.get("tile_style") })
    }

    async fn save(&self, user_id: Uuid, update: PreferenceUpdate) -> Result<(), PreferenceError> {
        if update.is_empty() {
            return Err(PreferenceError::Empty);
        }
        let result = sqlx::query(
            "UPDATE users
             SET color_palette = COALESCE($2, color_palette),
                 tile_style = COALESCE($3, tile_style)
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(update.color_palette.map(ColorPalette::as_str))
        .bind(update.tile_style.map(TileStyle::as_str))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PreferenceError::UserNotFound(user_id));
        }
        tracing::info!(%user_id, ?update, "preferences saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;
