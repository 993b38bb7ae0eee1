pub mod config;
pub mod engine;
pub mod forces;
pub mod grid;
pub mod node;

pub use config::ForceConfig;
pub use engine::{ConvergenceReason, ForceSimulation, SimulationState, SimulationStatus};
pub use grid::CollisionGrid;
pub use node::SimulationNode;
