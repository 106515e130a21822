//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from the boot
//! sequence to improve reuse and testability.

#[cfg(feature = "hydrate")]
pub mod dom;
#[cfg(feature = "hydrate")]
pub mod embed;
pub mod local_store;
pub mod nav;
#[cfg(feature = "hydrate")]
pub mod spinner;
