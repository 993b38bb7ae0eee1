use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::build::{BuildInput, CartogramData};
use super::config::DorlingConfig;
use super::frame::{AnimationStage, CartogramFrame};
use super::observer::{AnimationEvent, CartogramObserver};
use crate::error::{DorlingError, DorlingResult};
use crate::simulation::{ForceSimulation, SimulationState, SimulationStatus};

/// Drives the geographic/cartogram cycle.
///
/// Scheduling is cooperative: the host calls [`advance`](Self::advance) with
/// the time elapsed since the previous call. The dwell timer counts down
/// there and each call in the cartogram stage performs a bounded number of
/// simulation ticks. All node positions are written by the single owned
/// [`ForceSimulation`].
pub struct AnimationController {
    config: DorlingConfig,
    data: Option<Arc<CartogramData>>,
    simulation: ForceSimulation,
    stage: AnimationStage,
    playing: bool,
    dwell_remaining: Option<Duration>,
    frame: Option<CartogramFrame>,
    observers: Vec<Box<dyn CartogramObserver>>,
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("stage", &self.stage)
            .field("playing", &self.playing)
            .field("dwell_remaining", &self.dwell_remaining)
            .field("simulation_state", &self.simulation.state())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl AnimationController {
    pub fn new(config: DorlingConfig) -> DorlingResult<Self> {
        config.validate()?;
        let simulation = ForceSimulation::new(Vec::new(), config.force)?;
        let playing = config.animation.autoplay;
        Ok(Self {
            config,
            data: None,
            simulation,
            stage: AnimationStage::Geographic,
            playing,
            dwell_remaining: None,
            frame: None,
            observers: Vec::new(),
        })
    }

    pub fn register_observer(&mut self, observer: Box<dyn CartogramObserver>) -> DorlingResult<()> {
        let observer_id = observer.id().to_owned();
        if observer_id.is_empty() {
            return Err(DorlingError::InvalidData(
                "observer id must not be empty".to_owned(),
            ));
        }
        if self.observers.iter().any(|entry| entry.id() == observer_id) {
            return Err(DorlingError::InvalidData(format!(
                "observer with id `{observer_id}` is already registered"
            )));
        }
        self.observers.push(observer);
        Ok(())
    }

    pub fn unregister_observer(&mut self, observer_id: &str) -> bool {
        if let Some(position) = self
            .observers
            .iter()
            .position(|entry| entry.id() == observer_id)
        {
            self.observers.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Builds a data snapshot with the current configuration and restarts the
    /// cycle from the geographic view.
    ///
    /// Any active run is cancelled first. On error no snapshot is installed
    /// and the controller stays idle in the geographic stage.
    pub fn build(&mut self, input: &BuildInput) -> DorlingResult<Arc<CartogramData>> {
        self.cancel_simulation();
        self.stage = AnimationStage::Geographic;
        self.dwell_remaining = None;
        self.data = None;
        self.frame = None;

        let data = Arc::new(CartogramData::build(&self.config, input)?);
        self.simulation.replace_nodes(data.nodes())?;
        self.data = Some(Arc::clone(&data));
        self.playing = self.config.animation.autoplay;
        self.dwell_remaining = Some(self.config.animation.dwell());

        debug!(
            included = data.regions().len(),
            playing = self.playing,
            "cartogram rebuilt"
        );
        self.emit(AnimationEvent::Rebuilt {
            included_regions: data.regions().len(),
        });
        self.publish_frame(CartogramFrame::at_anchors(
            AnimationStage::Geographic,
            self.simulation.run_id(),
            &data,
        ));
        Ok(data)
    }

    /// Replaces the configuration and rebuilds.
    ///
    /// An invalid configuration is rejected before anything changes.
    pub fn rebuild(
        &mut self,
        config: DorlingConfig,
        input: &BuildInput,
    ) -> DorlingResult<Arc<CartogramData>> {
        config.validate()?;
        self.cancel_simulation();
        self.simulation.set_config(config.force)?;
        self.config = config;
        self.build(input)
    }

    /// Resumes the cycle from the current stage.
    pub fn play(&mut self) {
        self.set_playing(true);
        if self.data.is_none() {
            return;
        }
        match self.stage {
            AnimationStage::Geographic => {
                if self.dwell_remaining.is_none() {
                    self.dwell_remaining = Some(self.config.animation.dwell());
                }
            }
            AnimationStage::Cartogram => {
                if !self.simulation.is_running() {
                    self.enter_geographic();
                }
            }
        }
    }

    /// Stops the cycle from advancing to the next stage.
    ///
    /// A running simulation still settles; it just does not loop afterwards.
    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    /// Moves time forward by `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) {
        let Some(data) = self.data.clone() else {
            return;
        };
        match self.stage {
            AnimationStage::Geographic => self.advance_dwell(elapsed),
            AnimationStage::Cartogram => self.advance_simulation(&data),
        }
    }

    fn advance_dwell(&mut self, elapsed: Duration) {
        let Some(remaining) = self.dwell_remaining else {
            return;
        };
        if elapsed < remaining {
            self.dwell_remaining = Some(remaining - elapsed);
            return;
        }
        self.dwell_remaining = None;
        if self.playing {
            self.enter_cartogram();
        } else {
            debug!("dwell elapsed while paused");
        }
    }

    fn advance_simulation(&mut self, data: &CartogramData) {
        let stage = self.stage;
        for _ in 0..self.config.animation.ticks_per_advance {
            let run_id = self.simulation.run_id();
            let (frame, finished) = match self.simulation.step() {
                SimulationStatus::Running { nodes, tick } => (
                    CartogramFrame::from_nodes(stage, run_id, tick, data, nodes),
                    false,
                ),
                SimulationStatus::Converged { nodes, tick } => (
                    CartogramFrame::from_nodes(stage, run_id, tick, data, nodes),
                    true,
                ),
                SimulationStatus::Inactive => return,
            };
            let ticks = frame.tick;
            self.publish_frame(frame);

            if finished {
                self.emit(AnimationEvent::SimulationFinished { run_id, ticks });
                if self.config.animation.loop_animation && self.playing {
                    self.enter_geographic();
                }
                return;
            }
        }
    }

    fn enter_cartogram(&mut self) {
        let Some(data) = self.data.clone() else {
            return;
        };
        let run_id = self.simulation.start();
        self.stage = AnimationStage::Cartogram;
        debug!(run_id, "entered cartogram stage");
        self.emit(AnimationEvent::EnteredCartogram {
            fade_in: self.config.animation.fade_in(),
            run_id,
        });
        self.publish_frame(CartogramFrame::at_anchors(
            AnimationStage::Cartogram,
            run_id,
            &data,
        ));
    }

    fn enter_geographic(&mut self) {
        self.stage = AnimationStage::Geographic;
        self.dwell_remaining = Some(self.config.animation.dwell());
        debug!("entered geographic stage");
        self.emit(AnimationEvent::EnteredGeographic {
            fade_out: self.config.animation.fade_out(),
        });
        if let Some(data) = self.data.clone() {
            self.publish_frame(CartogramFrame::at_anchors(
                AnimationStage::Geographic,
                self.simulation.run_id(),
                &data,
            ));
        }
    }

    fn cancel_simulation(&mut self) {
        if self.simulation.stop() {
            self.emit(AnimationEvent::SimulationCancelled {
                run_id: self.simulation.run_id(),
            });
        }
    }

    fn set_playing(&mut self, playing: bool) {
        if self.playing == playing {
            return;
        }
        self.playing = playing;
        self.emit(AnimationEvent::PlaybackChanged { playing });
    }

    fn emit(&mut self, event: AnimationEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }

    fn publish_frame(&mut self, frame: CartogramFrame) {
        for observer in &mut self.observers {
            observer.on_frame(&frame);
        }
        self.frame = Some(frame);
    }

    #[must_use]
    pub fn config(&self) -> &DorlingConfig {
        &self.config
    }

    /// Latest data snapshot, if a build succeeded.
    #[must_use]
    pub fn data(&self) -> Option<Arc<CartogramData>> {
        self.data.clone()
    }

    /// Latest frame handed to observers.
    #[must_use]
    pub fn frame(&self) -> Option<&CartogramFrame> {
        self.frame.as_ref()
    }

    #[must_use]
    pub fn stage(&self) -> AnimationStage {
        self.stage
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn dwell_remaining(&self) -> Option<Duration> {
        self.dwell_remaining
    }

    #[must_use]
    pub fn simulation(&self) -> &ForceSimulation {
        &self.simulation
    }

    #[must_use]
    pub fn simulation_state(&self) -> SimulationState {
        self.simulation.state()
    }

    /// Id of the running simulation, if any.
    #[must_use]
    pub fn active_run_id(&self) -> Option<u64> {
        self.simulation
            .is_running()
            .then(|| self.simulation.run_id())
    }
}
