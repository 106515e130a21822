//! Sync coordinator: the single writer of active preference values.
//!
//! ARCHITECTURE
//! ============
//! A preference change runs in two phases. The synchronous phase writes the
//! root attribute and reflects the value into the page before `set` returns.
//! The asynchronous phase is the returned future: it posts the value to the
//! server and, unless the server commits it, writes it to device-local
//! storage. The caller spawns that future and never waits on it, so visual
//! state never waits on the network.
//!
//! Migration moves local values to the server once per page load:
//! commit first, then delete exactly the migrated keys. A 401 or failure
//! leaves local storage untouched for the next page load.
//!
//! Local values are authoritative whenever the server cannot hold them. A
//! page the server rendered without a session (`data-session="none"` on the
//! root) adopts them synchronously during `initialize`, before any widget is
//! reflected. Otherwise they are applied once the migration request settles,
//! unless the user changed that preference in the meantime.
//!
//! TRADE-OFFS
//! ==========
//! In-flight requests are not sequenced or cancelled. A rapid series of
//! changes always leaves the document showing the last value, but the server
//! converges to the last value only if the transport does not reorder
//! responses.

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;

use crate::dom::{ANONYMOUS_SESSION, Document, SESSION_ATTRIBUTE};
use crate::reflector::{apply_tile_style, update_live_preview, update_style_selector, update_theme_selector};
use crate::store::PreferenceStore;
use crate::{ActivePreferences, Preference, PreferenceForm, PreferenceKind, TileStyle};

// =============================================================================
// OUTCOMES
// =============================================================================

/// Why a persistence call did not commit, other than a missing session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    Status(u16),
    Transport(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "unexpected status {code}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

/// Result of one persistence POST.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistOutcome {
    Committed,
    Unauthenticated,
    Failed(FailureReason),
}

impl PersistOutcome {
    /// Classify an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Committed,
            401 => Self::Unauthenticated,
            other => Self::Failed(FailureReason::Status(other)),
        }
    }
}

/// Result of [`SyncCoordinator::migrate_local_preferences`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MigrationOutcome {
    NothingToMigrate,
    Migrated(Vec<PreferenceKind>),
    NotAuthenticated,
    Failed(FailureReason),
}

/// Sends a preference form to the server.
///
/// Implementations classify every response into a [`PersistOutcome`];
/// transport exceptions become [`FailureReason::Transport`].
#[async_trait(?Send)]
pub trait PreferenceTransport {
    async fn submit(&self, form: &PreferenceForm) -> PersistOutcome;
}

// =============================================================================
// COORDINATOR
// =============================================================================

pub struct SyncCoordinator<D> {
    document: D,
    store: PreferenceStore,
    transport: Rc<dyn PreferenceTransport>,
    csrf_token: String,
}

/// Active value of `kind` as the document shows it.
fn shown<D: Document>(document: &D, kind: PreferenceKind) -> Preference {
    document
        .root_attribute(kind.root_attribute())
        .and_then(|raw| Preference::parse(kind, &raw).ok())
        .unwrap_or_else(|| Preference::default_for(kind))
}

/// Write `value` to the root attribute and every widget that shows it.
fn reflect<D: Document>(document: &D, value: Preference) {
    document.set_root_attribute(value.kind().root_attribute(), value.as_str());
    match value {
        Preference::Palette(palette) => update_theme_selector(document, palette),
        Preference::TileStyle(style) => {
            apply_tile_style(document, style);
            update_style_selector(document, style);
            update_live_preview(document, style);
        }
    }
}

impl<D: Document + Clone + 'static> SyncCoordinator<D> {
    #[must_use]
    pub fn new(
        document: D,
        store: PreferenceStore,
        transport: Rc<dyn PreferenceTransport>,
        csrf_token: impl Into<String>,
    ) -> Self {
        Self { document, store, transport, csrf_token: csrf_token.into() }
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Active value of `kind`, read from the root attribute the server
    /// rendered. Falls back to the fixed default; never reads local storage.
    #[must_use]
    pub fn get(&self, kind: PreferenceKind) -> Preference {
        shown(&self.document, kind)
    }

    /// Whether the server rendered this page without a session.
    #[must_use]
    pub fn is_anonymous_render(&self) -> bool {
        self.document.root_attribute(SESSION_ATTRIBUTE).as_deref() == Some(ANONYMOUS_SESSION)
    }

    #[must_use]
    pub fn active(&self) -> ActivePreferences {
        PreferenceKind::ALL
            .into_iter()
            .fold(ActivePreferences::default(), |acc, kind| acc.with(self.get(kind)))
    }

    fn tile_style(&self) -> TileStyle {
        self.active().tile_style
    }

    /// Make `value` active and return the persistence future.
    ///
    /// The document already reflects `value` when this returns; the future
    /// only performs the POST and the local fallback.
    pub fn set(&self, value: Preference) -> LocalBoxFuture<'static, PersistOutcome> {
        reflect(&self.document, value);

        let form = PreferenceForm::new(self.csrf_token.clone()).with(value);
        let store = self.store.clone();
        let transport = Rc::clone(&self.transport);
        Box::pin(async move {
            let outcome = transport.submit(&form).await;
            keep_locally_unless_committed(&store, value, &outcome);
            outcome
        })
    }

    /// Bring widgets inserted since the last change in line with the active
    /// tile style.
    pub fn reapply(&self) {
        apply_tile_style(&self.document, self.tile_style());
    }

    /// Sync choice controls and the live preview with the active values.
    pub fn refresh_controls(&self) {
        let active = self.active();
        update_theme_selector(&self.document, active.color_palette);
        update_style_selector(&self.document, active.tile_style);
        update_live_preview(&self.document, active.tile_style);
    }

    /// Show every locally stored value. Returns what was applied.
    fn adopt_local_values(&self) -> Vec<Preference> {
        let local = self.store.read_all();
        for value in &local {
            reflect(&self.document, *value);
        }
        local
    }

    /// Move locally stored values into the server record.
    ///
    /// Local copies are removed only after the server commits them. Once the
    /// request settles the document shows the local values, which are then
    /// either the server record or the only record there is. A preference
    /// the user changed while the request was pending is left alone.
    pub fn migrate_local_preferences(&self) -> LocalBoxFuture<'static, MigrationOutcome> {
        let local = self.store.read_all();
        if local.is_empty() {
            return Box::pin(async { MigrationOutcome::NothingToMigrate });
        }

        let form = local
            .iter()
            .fold(PreferenceForm::new(self.csrf_token.clone()), |form, value| form.with(*value));
        let before = self.active();
        let document = self.document.clone();
        let store = self.store.clone();
        let transport = Rc::clone(&self.transport);
        Box::pin(async move {
            let outcome = transport.submit(&form).await;
            for value in &local {
                let kind = value.kind();
                if shown(&document, kind) == before.get(kind) {
                    reflect(&document, *value);
                }
            }
            match outcome {
                PersistOutcome::Committed => {
                    let kinds: Vec<PreferenceKind> = local.iter().map(|v| v.kind()).collect();
                    for kind in &kinds {
                        if let Err(e) = store.clear(*kind) {
                            log::warn!("migrated {kind} preference but could not clear local copy: {e}");
                        }
                    }
                    log::info!("migrated {} local preference(s) to the server", kinds.len());
                    MigrationOutcome::Migrated(kinds)
                }
                PersistOutcome::Unauthenticated => MigrationOutcome::NotAuthenticated,
                PersistOutcome::Failed(reason) => {
                    log::warn!("preference migration failed, keeping local copies: {reason}");
                    MigrationOutcome::Failed(reason)
                }
            }
        })
    }

    /// Page-load sequence: adopt local values on anonymous renders, re-apply
    /// styles, let the caller wire controls, refresh control state and
    /// preview, then return the migration future.
    ///
    /// The document is fully up to date before any request is created, and
    /// migration is the last step so it never races an explicit change made
    /// during wiring. An anonymous render skips the migration request, which
    /// could only be refused.
    pub fn initialize(&self, wire_controls: impl FnOnce(&Self)) -> LocalBoxFuture<'static, MigrationOutcome> {
        let anonymous = self.is_anonymous_render();
        let adopted = if anonymous { self.adopt_local_values() } else { Vec::new() };
        self.reapply();
        wire_controls(self);
        self.refresh_controls();
        if !anonymous {
            return self.migrate_local_preferences();
        }
        if adopted.is_empty() {
            return Box::pin(async { MigrationOutcome::NothingToMigrate });
        }
        log::debug!("anonymous page, showing {} locally kept preference(s)", adopted.len());
        Box::pin(async { MigrationOutcome::NotAuthenticated })
    }
}

fn keep_locally_unless_committed(store: &PreferenceStore, value: Preference, outcome: &PersistOutcome) {
    match outcome {
        PersistOutcome::Committed => return,
        PersistOutcome::Unauthenticated => {
            log::debug!("no session, keeping {} preference locally", value.kind());
        }
        PersistOutcome::Failed(reason) => {
            log::warn!("failed to persist {} preference, keeping it locally: {reason}", value.kind());
        }
    }
    if let Err(e) = store.write(value) {
        log::warn!("could not keep {} preference locally: {e}", value.kind());
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
