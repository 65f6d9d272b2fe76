//! `jobfs-server` — daemon internals.
//!
//! Assembles the served namespace (`/clone`, `/jobs/<name>/{ctl,
//! schedule, cmd, log}`), routes protocol requests to tree operations,
//! and persists job definitions to an append-only log replayed at
//! startup.

pub mod app;
pub mod clone;
pub mod conn;
pub mod defs;
pub mod dispatch;
pub mod jobfiles;
pub mod jobs;
pub mod registry;
