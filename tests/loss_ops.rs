//! Integration tests for the loss family

mod common;

use common::{assert_scalar_close, eval_state, train_state};
use trainr::prelude::*;

fn classification_batch() -> Batch {
    let mut batch = Batch::new();
    batch.insert("y", Tensor::from_slice(&[0i64, 2, 1, 1], &[4]));
    batch.insert(
        "y_pred",
        Tensor::from_slice(
            &[
                0.8f32, 0.1, 0.1, //
                0.2, 0.2, 0.6, //
                0.1, 0.7, 0.2, //
                0.25, 0.5, 0.25,
            ],
            &[4, 3],
        ),
    );
    batch
}

#[test]
fn test_sparse_ce_scalar_output() {
    let loss = SparseCategoricalCrossentropy::new("y", "y_pred", false);
    let batch = classification_batch();
    let out = loss.calculate_loss(&batch, &train_state()).unwrap();
    assert!(out.shape().is_empty());

    // mean of -ln(p[i, y_i])
    let want = -(0.8f64.ln() + 0.6f64.ln() + 0.7f64.ln() + 0.5f64.ln()) / 4.0;
    assert_scalar_close(&out, want, "sparse ce");
}

#[test]
fn test_mse_end_to_end() {
    let mut batch = Batch::new();
    batch.insert("y", Tensor::from_slice(&[1.0f32, 2.0], &[2]));
    batch.insert("y_pred", Tensor::from_slice(&[2.0f32, 0.0], &[2]));
    let loss = MeanSquaredError::new("y", "y_pred");
    let out = loss.calculate_loss(&batch, &train_state()).unwrap();
    assert_scalar_close(&out, 2.5, "mse");
}

#[test]
fn test_mixup_loss_eval_ignores_lambda() {
    let plain = SparseCategoricalCrossentropy::new("y", "y_pred", false);
    let mixed = MixUpLoss::new(
        SparseCategoricalCrossentropy::new("y", "y_pred", false),
        "y",
        "y_pred",
        "lambda",
    );

    // no lambda in the batch at all
    let batch = classification_batch();
    let want = plain
        .calculate_loss(&batch, &eval_state())
        .unwrap()
        .scalar_value()
        .unwrap();
    let got = mixed.calculate_loss(&batch, &eval_state()).unwrap();
    assert_scalar_close(&got, want, "eval mode is unmixed");
}

#[test]
fn test_mixup_loss_convexity_in_train_mode() {
    let mixed = MixUpLoss::new(
        SparseCategoricalCrossentropy::new("y", "y_pred", false),
        "y",
        "y_pred",
        "lambda",
    );
    let state = train_state();

    let at = |lam: f32| {
        let mut batch = classification_batch();
        batch.insert("lambda", Tensor::scalar(lam));
        mixed
            .calculate_loss(&batch, &state)
            .unwrap()
            .scalar_value()
            .unwrap()
    };

    let l1 = at(1.0);
    let l0 = at(0.0);
    for lam in [0.1f32, 0.3, 0.5, 0.7, 0.9] {
        let want = lam as f64 * l1 + (1.0 - lam as f64) * l0;
        let got = at(lam);
        assert!(
            (got - want).abs() < 1e-5,
            "lambda={lam}: got {got}, want {want}"
        );
    }
}

#[test]
fn test_mixup_loss_lambda_one_equals_plain_in_train() {
    let plain = SparseCategoricalCrossentropy::new("y", "y_pred", false);
    let mixed = MixUpLoss::new(
        SparseCategoricalCrossentropy::new("y", "y_pred", false),
        "y",
        "y_pred",
        "lambda",
    );

    let mut batch = classification_batch();
    batch.insert("lambda", Tensor::scalar(1.0));
    let state = train_state();
    let want = plain
        .calculate_loss(&batch, &state)
        .unwrap()
        .scalar_value()
        .unwrap();
    let got = mixed.calculate_loss(&batch, &state).unwrap();
    assert_scalar_close(&got, want, "lambda=1 is unmixed");
}

#[test]
fn test_mixup_loss_wraps_any_pairwise_loss() {
    // the MSE variant mixes the same way: check the rolled pairing directly
    let mixed = MixUpLoss::new(MeanSquaredError::new("y", "y_pred"), "y", "y_pred", "lambda");

    let mut batch = Batch::new();
    batch.insert("y", Tensor::from_slice(&[1.0f32, 3.0], &[2]));
    batch.insert("y_pred", Tensor::from_slice(&[1.0f32, 1.0], &[2]));
    batch.insert("lambda", Tensor::scalar(0.5));

    // loss1 per-example: [0, 4]; rolled y = [3, 1], loss2: [4, 0]
    // 0.5 * mean([0,4]) + 0.5 * mean([4,0]) = 2
    let got = mixed.calculate_loss(&batch, &train_state()).unwrap();
    assert_scalar_close(&got, 2.0, "mixup over mse");
}

#[test]
fn test_losses_as_trait_objects() {
    let losses: Vec<Box<dyn Loss>> = vec![
        Box::new(SparseCategoricalCrossentropy::new("y", "y_pred", false)),
        Box::new(MixUpLoss::new(
            SparseCategoricalCrossentropy::new("y", "y_pred", false),
            "y",
            "y_pred",
            "lambda",
        )),
    ];

    let mut batch = classification_batch();
    batch.insert("lambda", Tensor::scalar(0.3));
    for loss in &losses {
        let out = loss.calculate_loss(&batch, &train_state()).unwrap();
        assert!(out.scalar_value().unwrap().is_finite());
    }
}
