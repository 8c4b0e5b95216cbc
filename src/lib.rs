//! Library surface for the Kvenno backend.
//!
//! The games under `games::` are pure calculation/scoring helpers with no
//! I/O; everything else is the HTTP backend (router, state, upstream
//! client, conversion pipeline).

pub mod claude;
pub mod config;
pub mod convert;
pub mod error;
pub mod flashcards;
pub mod games;
pub mod protocol;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod telemetry;
