//! Integration tests for the augmentation op family

mod common;

use common::{assert_allclose_f32, eval_state, train_state};
use trainr::prelude::*;

#[test]
fn test_mixup_batch_and_loss_agree() {
    // run the op, then verify the written tensors satisfy the published
    // contract: output = lambda * x + (1 - lambda) * roll(x, 1)
    let n = 4;
    let data: Vec<f32> = (0..n * 6).map(|v| v as f32).collect();
    let x = Tensor::from_slice(&data, &[n, 6]);

    let mut batch = Batch::new();
    batch.insert("x", x.clone());
    let op = MixUpBatch::new("x", "x", "lambda", 1.0).unwrap();
    op.forward(&mut batch, &train_state()).unwrap();

    let lam = batch.get("lambda").unwrap().scalar_value().unwrap() as f32;
    let rolled = x.roll(1, 0).unwrap();
    let want = x
        .mul_scalar(lam as f64)
        .unwrap()
        .add(&rolled.mul_scalar(1.0 - lam as f64).unwrap())
        .unwrap();

    assert_allclose_f32(
        &batch.get("x").unwrap().to_vec::<f32>().unwrap(),
        &want.to_vec::<f32>().unwrap(),
        1e-5,
        1e-6,
        "mixup output",
    );
}

#[test]
fn test_cutmix_lambda_matches_pasted_area() {
    // constant-valued images make pasted pixels countable
    let mut data = vec![0.0f32; 64];
    data.extend(vec![1.0f32; 64]);
    let x = Tensor::from_slice(&data, &[2, 8, 8, 1]);

    let mut batch = Batch::new();
    batch.insert("x", x);
    let op = CutMixBatch::new("x", "x", "lambda", 1.0).unwrap();
    op.forward(&mut batch, &train_state()).unwrap();

    let lam = batch.get("lambda").unwrap().scalar_value().unwrap();
    assert!((0.0..=1.0).contains(&lam));

    let out = batch.get("x").unwrap().to_vec::<f32>().unwrap();
    // image 0 receives image 1's pixels (value 1) inside the patch
    let pasted = out[..64].iter().filter(|&&v| v == 1.0).count();
    assert_eq!(pasted, ((1.0 - lam) * 64.0).round() as usize);
    // and both images received the same box
    let pasted_1 = out[64..].iter().filter(|&&v| v == 0.0).count();
    assert_eq!(pasted, pasted_1);
}

#[test]
fn test_forward_ops_skips_train_ops_in_eval() {
    let ops: Vec<Box<dyn TensorOp>> = vec![
        Box::new(MixUpBatch::new("x", "x", "lambda", 1.0).unwrap()),
        Box::new(CutMixBatch::new("x", "x", "lambda", 1.0).unwrap()),
    ];

    let data: Vec<f32> = (0..32).map(|v| v as f32).collect();
    let mut batch = Batch::new();
    batch.insert("x", Tensor::from_slice(&data, &[2, 4, 4, 1]));

    forward_ops(&ops, &mut batch, &eval_state()).unwrap();
    // nothing ran: input untouched, no lambda written
    assert_eq!(batch.get("x").unwrap().to_vec::<f32>().unwrap(), data);
    assert!(!batch.contains("lambda"));
}

#[test]
fn test_forward_ops_pipeline_in_train() {
    let ops: Vec<Box<dyn TensorOp>> = vec![Box::new(
        MixUpBatch::new("x", "x_mixed", "lambda", 1.0).unwrap(),
    )];

    let mut batch = Batch::new();
    batch.insert("x", Tensor::from_slice(&[1.0f32, 2.0], &[2, 1]));
    forward_ops(&ops, &mut batch, &train_state()).unwrap();
    assert!(batch.contains("x_mixed"));
    assert!(batch.contains("lambda"));
}

#[test]
fn test_flip_image_and_bbox_consistency() {
    // a 2x2 image with a 1x1 box over the bright pixel; after flipping, the
    // box must still cover it
    let img = Tensor::from_slice(&[9.0f32, 0.0, 0.0, 0.0], &[1, 2, 2, 1]);
    let bbox = Tensor::from_slice(&[0.0f32, 0.0, 1.0, 1.0], &[1, 4]);

    let mut batch = Batch::new();
    batch.insert("x", img);
    batch.insert("bbox", bbox);
    let op = FlipImageAndBbox::new("x", "bbox", 1.0).unwrap();
    op.forward(&mut batch, &train_state()).unwrap();

    let flipped = batch.get("x").unwrap().to_vec::<f32>().unwrap();
    let boxes = batch.get("bbox").unwrap().to_vec::<f32>().unwrap();
    // bright pixel moved to column 1, box origin follows
    assert_eq!(flipped, vec![0.0, 9.0, 0.0, 0.0]);
    assert_eq!(boxes, vec![1.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_augmentation_2d_identity_when_disabled() {
    let data: Vec<f32> = (0..48).map(|v| v as f32 / 48.0).collect();
    let mut batch = Batch::new();
    batch.insert("x", Tensor::from_slice(&data, &[2, 4, 4, 1]));

    let op = Augmentation2D::new("x", "x");
    op.forward(&mut batch, &train_state()).unwrap();
    assert_eq!(batch.get("x").unwrap().to_vec::<f32>().unwrap(), data);
}

#[test]
fn test_augmentation_2d_preserves_shape_and_range() {
    let data = vec![0.5f32; 2 * 8 * 8 * 3];
    let mut batch = Batch::new();
    batch.insert("x", Tensor::from_slice(&data, &[2, 8, 8, 3]));

    let op = Augmentation2D::new("x", "x")
        .with_rotation(30.0)
        .with_shift(0.2, 0.2)
        .with_zoom(0.8, 1.2)
        .with_flip_left_right();
    op.forward(&mut batch, &train_state()).unwrap();

    let out = batch.get("x").unwrap();
    assert_eq!(out.shape(), &[2, 8, 8, 3]);
    // bilinear interpolation of a constant image with zero fill can only
    // produce values in [0, 0.5]
    for v in out.to_vec::<f32>().unwrap() {
        assert!((0.0..=0.5 + 1e-6).contains(&v));
    }
}

#[test]
fn test_single_example_batch_mixup_degenerates() {
    // with one example, roll is the identity and mixing changes nothing
    let x = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[1, 3]);
    let mut batch = Batch::new();
    batch.insert("x", x.clone());
    let op = MixUpBatch::new("x", "x", "lambda", 1.0).unwrap();
    op.forward(&mut batch, &train_state()).unwrap();

    assert_allclose_f32(
        &batch.get("x").unwrap().to_vec::<f32>().unwrap(),
        &x.to_vec::<f32>().unwrap(),
        1e-5,
        1e-6,
        "single-example mixup",
    );
}
