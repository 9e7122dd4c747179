//! OICP roaming core - typed identifiers and CPO-side protocol orchestration
//!
//! The [`domain`] module holds the identifier kernel, the EVSE data model,
//! deterministic pool and station id derivation and the status diff engine.
//! The [`client`] module pushes data and status to the hub, authorizes
//! charging sessions and submits charge detail records through a pluggable
//! [`client::Transport`].

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod telemetry;

pub use client::CpoClient;
pub use error::{Error, Result};
