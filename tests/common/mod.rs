//! Common test utilities
#![allow(dead_code)]

use trainr::prelude::*;

/// Assert two f32 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert a scalar tensor holds the expected value
pub fn assert_scalar_close(t: &Tensor, want: f64, msg: &str) {
    let got = t.scalar_value().expect("scalar tensor");
    assert!(
        (got - want).abs() <= 1e-5 + 1e-5 * want.abs(),
        "{}: {} vs {}",
        msg,
        got,
        want
    );
}

/// A train-mode state at epoch 0, step 0
pub fn train_state() -> State {
    State::new(Mode::Train, 0, 0)
}

/// An eval-mode state at epoch 0, step 0
pub fn eval_state() -> State {
    State::new(Mode::Eval, 0, 0)
}
