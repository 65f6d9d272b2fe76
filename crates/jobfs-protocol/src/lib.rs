//! `jobfs-protocol` — wire types for the jobfs file protocol.
//!
//! The protocol is connection-oriented and message-framed: each frame is
//! one JSON object on its own line. Clients hold fids — per-connection
//! handles into the served tree — and drive the daemon with the 9P-style
//! semantic operations `attach`, `walk`, `open`, `read`, `write`, `stat`,
//! `wstat`, and `clunk`.

pub mod frames;
pub mod messages;
pub mod methods;
