mod build;
mod config;
mod controller;
mod frame;
mod observer;

pub use build::{BuildInput, CartogramData, IncludedRegion, RegionSummary};
pub use config::{
    AnimationBehavior, DEFAULT_STATISTICS_BASE_URL, DatasetSelection, DorlingConfig,
};
pub use controller::AnimationController;
pub use frame::{
    AnimationStage, CARTOGRAM_FRAME_JSON_SCHEMA_V1, CartogramFrame, CartogramFrameJsonContractV1,
    CircleState,
};
pub use observer::{AnimationEvent, CartogramObserver};
