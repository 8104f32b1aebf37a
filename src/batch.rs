//! The dictionary-based batch/state contract
//!
//! The external training loop hands every op and loss two things: the
//! [`Batch`] (a string-keyed map of tensors, after the forward pass) and the
//! running [`State`] (mode, epoch, step). Ops read their input keys and write
//! their output keys; losses read truth/prediction keys and return a scalar.

use crate::error::{Error, Result};
use crate::tensor::Tensor;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Execution mode of the surrounding loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Gradient-update pass; mixing and augmentation are active
    Train,
    /// Validation pass during training
    Eval,
    /// Held-out evaluation after training
    Test,
    /// Serving/prediction, no ground truth present
    Infer,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Train => "train",
            Mode::Eval => "eval",
            Mode::Test => "test",
            Mode::Infer => "infer",
        };
        f.write_str(s)
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(Mode::Train),
            "eval" => Ok(Mode::Eval),
            "test" => Ok(Mode::Test),
            "infer" => Ok(Mode::Infer),
            other => Err(Error::invalid_argument(
                "mode",
                format!("unknown mode '{other}'"),
            )),
        }
    }
}

/// Running state of the training loop, passed to every op and loss
#[derive(Debug, Clone, Copy)]
pub struct State {
    /// Current execution mode
    pub mode: Mode,
    /// Zero-based epoch counter
    pub epoch: usize,
    /// Global step counter
    pub step: usize,
}

impl State {
    /// Create a new state
    pub fn new(mode: Mode, epoch: usize, step: usize) -> Self {
        Self { mode, epoch, step }
    }

    /// Whether the loop is in training mode
    #[inline]
    pub fn is_train(&self) -> bool {
        self.mode == Mode::Train
    }
}

/// One batch of named tensors flowing through the loop
///
/// Keys are the contract between ops, losses, and the trainer: an
/// augmentation op consumes `"x"` and may write `"x"` and `"lambda"`; a loss
/// reads `"y"` and `"y_pred"`.
#[derive(Debug, Default)]
pub struct Batch {
    entries: HashMap<String, Tensor>,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a tensor by key
    ///
    /// Returns [`Error::MissingKey`] if the key is absent - the standard
    /// failure when an op's upstream producer was not scheduled.
    pub fn get(&self, key: &str) -> Result<&Tensor> {
        self.entries.get(key).ok_or_else(|| Error::missing_key(key))
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a tensor under a key
    pub fn insert(&mut self, key: impl Into<String>, tensor: Tensor) {
        self.entries.insert(key.into(), tensor);
    }

    /// Remove a tensor by key, returning it if present
    pub fn remove(&mut self, key: &str) -> Option<Tensor> {
        self.entries.remove(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the batch holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, tensor)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
