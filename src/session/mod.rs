use std::path::Path;
use thiserror::Error;
use tracing::{info,warn};

use crate::Float;
use crate::point_cloud::{PointCloud,LoadReport};
use crate::io::{pcd_loader::{load_point_cloud,FormatError},calibration::{load_calibration,save_calibration,Calibration,CalibrationError,SaveMode},frame_pairing::{FrameSet,FramePair}};
use crate::sensors::camera::pinhole::Pinhole;
use crate::extrinsics::{CanonicalExtrinsic,frame_converter::AxisConvention,composer::{compose,AdjustmentDeltas,DeltaAxis}};
use crate::projection::{project,Canvas,Projection};

pub mod command;

#[derive(Debug,Error)]
pub enum SessionError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error("the session has no frames to display")]
    NoFrames
}

/// The frame on display. Replaced as a whole on navigation.
#[derive(Debug,Clone,PartialEq)]
pub struct Frame {
    pub index: usize,
    pub pair: FramePair,
    pub cloud: PointCloud,
    pub report: LoadReport
}

/**
 * State of one interactive adjustment run. The base extrinsic is converted
 * once when the calibration is loaded and never touched afterwards, every
 * projection composes the current deltas onto it afresh.
 */
#[derive(Debug,Clone)]
pub struct AdjustmentSession {
    intrinsic: Pinhole,
    base: CanonicalExtrinsic,
    convention: AxisConvention,
    image_size: Option<(u32,u32)>,
    deltas: AdjustmentDeltas,
    frames: FrameSet,
    current: Frame
}

impl AdjustmentSession {
    pub fn open(calibration_path: &Path, convention: AxisConvention, frames: FrameSet) -> Result<AdjustmentSession, SessionError> {
        let calibration = load_calibration(calibration_path)?;
        AdjustmentSession::from_calibration(calibration, convention, frames)
    }

    pub fn from_calibration(calibration: Calibration, convention: AxisConvention, frames: FrameSet) -> Result<AdjustmentSession, SessionError> {
        let first = frames.get(0).ok_or(SessionError::NoFrames)?.clone();
        let current = load_frame(0, first)?;

        Ok(AdjustmentSession {
            intrinsic: calibration.intrinsic,
            base: calibration.extrinsic.into_canonical(convention),
            convention,
            image_size: calibration.image_size,
            deltas: AdjustmentDeltas::default(),
            frames,
            current
        })
    }

    pub fn intrinsic(&self) -> &Pinhole {
        &self.intrinsic
    }

    pub fn base_extrinsic(&self) -> &CanonicalExtrinsic {
        &self.base
    }

    pub fn working_extrinsic(&self) -> CanonicalExtrinsic {
        compose(&self.base, &self.deltas)
    }

    pub fn deltas(&self) -> &AdjustmentDeltas {
        &self.deltas
    }

    pub fn set_deltas(&mut self, deltas: AdjustmentDeltas) -> () {
        self.deltas = AdjustmentDeltas::new(deltas.alpha, deltas.beta, deltas.gamma, deltas.dx, deltas.dy, deltas.dz);
    }

    pub fn nudge(&mut self, axis: DeltaAxis, step: Float) -> () {
        self.deltas = self.deltas.nudged(axis, step);
    }

    pub fn reset_deltas(&mut self) -> () {
        self.deltas = AdjustmentDeltas::default();
    }

    pub fn current_frame(&self) -> &Frame {
        &self.current
    }

    pub fn current_index(&self) -> usize {
        self.current.index
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Canvas from the calibrated image size, if the calibration carries one.
    pub fn canvas(&self) -> Option<Canvas> {
        self.image_size.map(|(w,h)| Canvas::from_image_size(w,h))
    }

    pub fn next_frame(&mut self) -> Result<usize, SessionError> {
        self.jump_to_frame(self.current.index.saturating_add(1))
    }

    pub fn previous_frame(&mut self) -> Result<usize, SessionError> {
        self.jump_to_frame(self.current.index.saturating_sub(1))
    }

    /**
     * Indices past the last frame are clamped. If the target frame fails to
     * load, the current frame stays on display and the error is returned.
     */
    pub fn jump_to_frame(&mut self, index: usize) -> Result<usize, SessionError> {
        let last = self.frames.len().saturating_sub(1);
        let target = index.min(last);
        if target != index {
            warn!("frame {} requested, clamped to {}", index, target);
        }
        if target == self.current.index {
            return Ok(target);
        }

        let pair = self.frames.get(target).ok_or(SessionError::NoFrames)?.clone();
        self.current = load_frame(target, pair)?;
        info!("showing frame {}/{}: {}", target+1, self.frames.len(), self.current.pair.stem());
        Ok(target)
    }

    pub fn project(&self, canvas: Option<&Canvas>) -> Projection {
        project(&self.intrinsic, &self.working_extrinsic(), &self.current.cloud, canvas)
    }

    pub fn save_calibration(&self, path: &Path, mode: SaveMode) -> Result<(), SessionError> {
        save_calibration(&self.intrinsic, &self.working_extrinsic(), self.convention, mode, self.image_size, path)?;
        Ok(())
    }

    /// Swaps in a new calibration and clears the deltas. Keeps the old one on failure.
    pub fn reload_calibration(&mut self, path: &Path) -> Result<(), SessionError> {
        let calibration = load_calibration(path)?;
        self.intrinsic = calibration.intrinsic;
        self.base = calibration.extrinsic.into_canonical(self.convention);
        self.image_size = calibration.image_size;
        self.reset_deltas();
        Ok(())
    }
}

fn load_frame(index: usize, pair: FramePair) -> Result<Frame, SessionError> {
    let (cloud, report) = load_point_cloud(&pair.point_cloud)?;
    Ok(Frame{index, pair, cloud, report})
}
