use std::path::PathBuf;

use crate::Float;
use crate::io::calibration::SaveMode;
use crate::extrinsics::composer::{AdjustmentDeltas,DeltaAxis};
use crate::session::{AdjustmentSession,SessionError};

/// Discrete operator actions a front-end can send.
#[derive(Debug,Clone,PartialEq)]
pub enum Command {
    Nudge(DeltaAxis, Float),
    SetDeltas(AdjustmentDeltas),
    ResetDeltas,
    NextFrame,
    PreviousFrame,
    JumpToFrame(usize),
    Save { path: PathBuf, mode: SaveMode }
}

impl AdjustmentSession {
    pub fn apply(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::Nudge(axis, step) => self.nudge(axis, step),
            Command::SetDeltas(deltas) => self.set_deltas(deltas),
            Command::ResetDeltas => self.reset_deltas(),
            Command::NextFrame => { self.next_frame()?; },
            Command::PreviousFrame => { self.previous_frame()?; },
            Command::JumpToFrame(index) => { self.jump_to_frame(index)?; },
            Command::Save { path, mode } => self.save_calibration(&path, mode)?
        };
        Ok(())
    }
}
