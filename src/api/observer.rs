use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::frame::CartogramFrame;

/// State changes of the animation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationEvent {
    /// New data snapshot installed; the cycle restarts from the geographic view.
    Rebuilt { included_regions: usize },
    /// Circles fade out over `fade_out` and the regions show again.
    EnteredGeographic { fade_out: Duration },
    /// Circles fade in over `fade_in` while run `run_id` resolves them.
    EnteredCartogram { fade_in: Duration, run_id: u64 },
    SimulationFinished { run_id: u64, ticks: u32 },
    SimulationCancelled { run_id: u64 },
    PlaybackChanged { playing: bool },
}

/// Rendering-side hook.
///
/// Observers receive every state change and one frame per simulation tick;
/// they never mutate controller state.
pub trait CartogramObserver {
    fn id(&self) -> &str;

    fn on_event(&mut self, _event: AnimationEvent) {}

    fn on_frame(&mut self, _frame: &CartogramFrame) {}
}
