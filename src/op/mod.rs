//! Tensor operations applied to the batch by the training loop
//!
//! A [`TensorOp`] is a stateless strategy object the trainer invokes once per
//! batch, between the data pipeline and the model forward pass. Ops read
//! their input keys from the [`Batch`], transform tensors, and write their
//! output keys back. [`forward_ops`] runs a schedule of ops in order,
//! skipping those scoped to a different mode.

pub mod augmentation;

use crate::batch::{Batch, Mode, State};
use crate::error::Result;

/// A batch-level tensor transform
pub trait TensorOp {
    /// The mode this op is scoped to, or `None` to run in every mode
    ///
    /// Augmentation ops are typically `Some(Mode::Train)`: mixing or warping
    /// inputs during evaluation would corrupt the metrics.
    fn mode(&self) -> Option<Mode> {
        None
    }

    /// Apply the transform to the batch
    fn forward(&self, batch: &mut Batch, state: &State) -> Result<()>;
}

/// Run a schedule of ops against one batch
///
/// Ops whose [`TensorOp::mode`] does not match the current state are skipped,
/// not errored: the same schedule is reused across train and eval passes.
pub fn forward_ops(ops: &[Box<dyn TensorOp>], batch: &mut Batch, state: &State) -> Result<()> {
    for op in ops {
        if let Some(scoped) = op.mode() {
            if scoped != state.mode {
                continue;
            }
        }
        op.forward(batch, state)?;
    }
    Ok(())
}
