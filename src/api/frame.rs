use serde::{Deserialize, Serialize};

use super::build::CartogramData;
use crate::core::color::Color;
use crate::core::types::RegionId;
use crate::error::{DorlingError, DorlingResult};
use crate::simulation::SimulationNode;

pub const CARTOGRAM_FRAME_JSON_SCHEMA_V1: u32 = 1;

/// Which view is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimationStage {
    #[default]
    Geographic,
    Cartogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleState {
    pub id: RegionId,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Color,
}

/// Per-tick drawing snapshot of every included region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartogramFrame {
    pub stage: AnimationStage,
    pub run_id: u64,
    pub tick: u32,
    pub circles: Vec<CircleState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartogramFrameJsonContractV1 {
    pub schema_version: u32,
    pub frame: CartogramFrame,
}

impl CartogramFrame {
    /// Circles at their anchors.
    #[must_use]
    pub fn at_anchors(stage: AnimationStage, run_id: u64, data: &CartogramData) -> Self {
        Self {
            stage,
            run_id,
            tick: 0,
            circles: data
                .regions()
                .iter()
                .map(|region| CircleState {
                    id: region.id.clone(),
                    x: region.anchor.x,
                    y: region.anchor.y,
                    radius: region.radius,
                    color: region.color,
                })
                .collect(),
        }
    }

    /// Circles at simulated positions; `nodes` follow the region order of
    /// `data`.
    #[must_use]
    pub fn from_nodes(
        stage: AnimationStage,
        run_id: u64,
        tick: u32,
        data: &CartogramData,
        nodes: &[SimulationNode],
    ) -> Self {
        Self {
            stage,
            run_id,
            tick,
            circles: data
                .regions()
                .iter()
                .zip(nodes)
                .map(|(region, node)| CircleState {
                    id: region.id.clone(),
                    x: node.x,
                    y: node.y,
                    radius: node.radius,
                    color: region.color,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn circle(&self, id: &str) -> Option<&CircleState> {
        self.circles.iter().find(|circle| circle.id == id)
    }

    pub fn to_json_pretty(&self) -> DorlingResult<String> {
        let payload = CartogramFrameJsonContractV1 {
            schema_version: CARTOGRAM_FRAME_JSON_SCHEMA_V1,
            frame: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            DorlingError::InvalidData(format!("failed to serialize frame contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> DorlingResult<Self> {
        if let Ok(frame) = serde_json::from_str::<Self>(input) {
            return Ok(frame);
        }
        let payload: CartogramFrameJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            DorlingError::InvalidData(format!("failed to parse frame json payload: {e}"))
        })?;
        if payload.schema_version != CARTOGRAM_FRAME_JSON_SCHEMA_V1 {
            return Err(DorlingError::InvalidData(format!(
                "unsupported frame schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.frame)
    }
}
