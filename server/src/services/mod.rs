//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own persistence and token logic so route handlers can
//! stay focused on protocol translation and auth plumbing.

pub mod csrf;
pub mod preferences;
pub mod session;
