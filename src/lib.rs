//! dorling-rs: Dorling cartogram core.
//!
//! Statistics responses are indexed into per-region indicators, turned into
//! circle radii and colors, and laid out by a force simulation that keeps
//! circles near their geographic anchors without overlapping. An
//! [`AnimationController`] alternates between the geographic view and the
//! cartogram and reports frames to rendering observers.

pub mod api;
pub mod core;
pub mod error;
pub mod simulation;
pub mod telemetry;

pub use api::{AnimationController, BuildInput, CartogramData, DorlingConfig};
pub use error::{DorlingError, DorlingResult};
