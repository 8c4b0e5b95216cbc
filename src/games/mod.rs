//! Pure calculation/scoring helpers shared by the browser games.
//!
//! Everything in here is synchronous, allocation-light and free of I/O; the
//! game frontends call these on every user action. Each game keeps its own
//! scoring/tolerance policy; the differences are deliberate, see `scoring`.

pub mod equation;
pub mod hess;
pub mod molecule;
pub mod scoring;
