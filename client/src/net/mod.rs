//! Network layer for talking to the server.

pub mod api;
