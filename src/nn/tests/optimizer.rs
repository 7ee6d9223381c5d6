/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 优化器更新规则测试（参考值按 Keras 的更新公式手算）
 *
 * 统一使用参数 [1.0, 2.0]、梯度 [0.5, -1.0]，
 * 自适应类优化器第一步的位移约为 lr 乘以梯度符号。
 */

use crate::nn::optimizer::{
    Adadelta, Adagrad, Adam, Adamax, GradClip, Nadam, Optimizer, OptimizerKind, PAS, PPAS,
    RMSprop, SGD, global_norm,
};
use crate::nn::{GraphError, WeightShape};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn params() -> Vec<Tensor> {
    vec![Tensor::new(&[1.0, 2.0], &[2])]
}

fn grads() -> Vec<Tensor> {
    vec![Tensor::new(&[0.5, -1.0], &[2])]
}

fn one_step(mut optimizer: OptimizerKind) -> Vec<f32> {
    let mut p = params();
    optimizer.step(&mut p, &grads(), 1.0).unwrap();
    assert_eq!(optimizer.iterations(), 1);
    p[0].data().iter().copied().collect()
}

fn assert_values(actual: &[f32], expected: &[f32], eps: f32) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(*a, *e, epsilon = eps);
    }
}

// ==================== 梯度裁剪 ====================

#[test]
fn test_global_norm() {
    let g = vec![Tensor::new(&[3.0], &[1]), Tensor::new(&[4.0], &[1])];
    assert_abs_diff_eq!(global_norm(&g), 5.0);
}

#[test]
fn test_clipnorm_then_clipvalue() {
    let g = vec![Tensor::new(&[3.0, 4.0], &[2])];

    let by_norm = GradClip::new(1.0, 0.0).apply(&g);
    assert_values(by_norm[0].data().as_slice().unwrap(), &[0.6, 0.8], 1e-6);

    let both = GradClip::new(1.0, 0.7).apply(&g);
    assert_values(both[0].data().as_slice().unwrap(), &[0.6, 0.7], 1e-6);

    let untouched = GradClip::new(10.0, 0.0).apply(&g);
    assert_eq!(untouched, g);
    assert_eq!(GradClip::none().apply(&g), g);
    assert_eq!(GradClip::default(), GradClip::new(10.0, 0.0));
}

// ==================== 各优化器单步 ====================

#[test]
fn test_sgd_step() {
    assert_values(&one_step(SGD::new(0.1).into()), &[0.95, 2.1], 1e-6);
}

#[test]
fn test_sgd_momentum() {
    let mut sgd = SGD::new_with_config(0.1, 0.9, 0.0, false, GradClip::none());
    let mut p = params();
    sgd.step(&mut p, &grads(), 0.0).unwrap();
    sgd.step(&mut p, &grads(), 0.0).unwrap();
    assert_values(p[0].data().as_slice().unwrap(), &[0.855, 2.29], 1e-6);

    sgd.reset();
    assert_eq!(sgd.iterations(), 0);
}

#[test]
fn test_sgd_nesterov() {
    let sgd = SGD::new_with_config(0.1, 0.9, 0.0, true, GradClip::none());
    assert_values(&one_step(sgd.into()), &[0.905, 2.19], 1e-6);
}

#[test]
fn test_sgd_decay_uses_previous_iterations() {
    let mut sgd = SGD::new_with_config(0.1, 0.0, 1.0, false, GradClip::none());
    let mut p = vec![Tensor::zeros(&[1])];
    let g = vec![Tensor::ones(&[1])];
    sgd.step(&mut p, &g, 0.0).unwrap();
    assert_abs_diff_eq!(p[0].data().as_slice().unwrap()[0], -0.1, epsilon = 1e-6);
    sgd.step(&mut p, &g, 0.0).unwrap();
    assert_abs_diff_eq!(p[0].data().as_slice().unwrap()[0], -0.15, epsilon = 1e-6);
}

#[test]
fn test_rmsprop_step() {
    let d = 0.001 / 0.1_f32.sqrt();
    assert_values(&one_step(RMSprop::new(0.001).into()), &[1.0 - d, 2.0 + d], 1e-6);
}

#[test]
fn test_adagrad_step() {
    assert_values(&one_step(Adagrad::new(0.01).into()), &[0.99, 2.01], 1e-6);
}

#[test]
fn test_adadelta_step() {
    assert_values(&one_step(Adadelta::new(1.0).into()), &[0.999, 2.001], 1e-5);
}

#[test]
fn test_adam_step() {
    assert_values(&one_step(Adam::new(0.001).into()), &[0.999, 2.001], 1e-6);
}

#[test]
fn test_adamax_step() {
    assert_values(&one_step(Adamax::new(0.002).into()), &[0.998, 2.002], 1e-6);
}

#[test]
fn test_nadam_step_without_schedule_decay() {
    // μ 恒为 0.45：m̄ = g + 0.45 * 0.1g / (1 - 0.45²)
    let d = 0.002 * (1.0 + 0.045 / 0.7975);
    let nadam = Nadam::new_with_config(0.002, 0.9, 0.999, 0.0, GradClip::none());
    assert_values(&one_step(nadam.into()), &[1.0 - d, 2.0 + d], 1e-5);
}

#[test]
fn test_step_rejects_mismatched_gradients() {
    let mut adam: OptimizerKind = Adam::new(0.001).into();
    let mut p = params();
    let err = adam
        .step(&mut p, &[Tensor::ones(&[3])], 0.0)
        .unwrap_err();
    assert!(matches!(err, GraphError::ShapeMismatch { .. }));
    assert!(adam.step(&mut p, &[], 0.0).is_err());
    assert_eq!(adam.iterations(), 0);
}

#[test]
fn test_learning_rate_accessors() {
    let mut opt: OptimizerKind = RMSprop::new(0.001).into();
    assert_eq!(opt.name(), "RMSprop");
    assert_abs_diff_eq!(opt.learning_rate(), 0.001);
    opt.set_learning_rate(0.01);
    assert_abs_diff_eq!(opt.learning_rate(), 0.01);
}

// ==================== PAS 系列 ====================

fn shapes() -> Vec<WeightShape> {
    vec![WeightShape::new("w", &[2])]
}

#[test]
fn test_pas_step() {
    // ‖g‖² = 1.25，loss = 1.25 -> τ ≈ 1
    let mut pas = PAS::new(shapes(), 1.0, 10.0, GradClip::none());
    let mut p = params();
    pas.step(&mut p, &grads(), 1.25).unwrap();
    assert_values(p[0].data().as_slice().unwrap(), &[0.5, 3.0], 1e-5);
}

#[test]
fn test_pas_step_capped_by_c() {
    let mut pas = PAS::new(shapes(), 1.0, 0.1, GradClip::none());
    let mut p = params();
    pas.step(&mut p, &grads(), 100.0).unwrap();
    assert_values(p[0].data().as_slice().unwrap(), &[0.95, 2.1], 1e-6);
}

#[test]
fn test_pas_passive_on_zero_loss() {
    let mut pas = PAS::new(shapes(), 1.0, 10.0, GradClip::none());
    let mut p = params();
    pas.step(&mut p, &grads(), 0.0).unwrap();
    assert_eq!(p, params());
    assert_eq!(pas.iterations(), 1);
}

#[test]
fn test_pas_rejects_unexpected_shapes() {
    let mut pas = PAS::new(vec![WeightShape::new("w", &[3])], 1.0, 1.0, GradClip::none());
    let mut p = params();
    let err = pas.step(&mut p, &grads(), 1.0).unwrap_err();
    assert!(matches!(err, GraphError::ShapeMismatch { .. }));

    let mut ppas = PPAS::new(
        vec![WeightShape::new("w", &[2]), WeightShape::new("b", &[1])],
        1.0,
        1.0,
        GradClip::none(),
    );
    assert!(ppas.step(&mut p, &grads(), 1.0).is_err());
}

#[test]
fn test_ppas_proximal_term() {
    let mut ppas = PPAS::new(shapes(), 1.0, 10.0, GradClip::none());
    assert_eq!(ppas.anchors(), &[Tensor::zeros(&[2])]);

    let mut p = params();
    ppas.step(&mut p, &grads(), 1.25).unwrap();
    // 第一步锚点即为初始权重，近端项为0
    assert_values(p[0].data().as_slice().unwrap(), &[0.5, 3.0], 1e-5);
    assert_eq!(ppas.anchors(), params().as_slice());

    // 零梯度时只剩近端项：θ -= (lr / C) * (θ - θ₀)
    ppas.step(&mut p, &[Tensor::zeros(&[2])], 1.0).unwrap();
    assert_values(p[0].data().as_slice().unwrap(), &[0.55, 2.9], 1e-5);

    ppas.reset();
    assert_eq!(ppas.anchors(), &[Tensor::zeros(&[2])]);
}

#[test]
fn test_optimizer_kind_dispatch() {
    let kinds: Vec<OptimizerKind> = vec![
        SGD::new(0.01).into(),
        RMSprop::new(0.001).into(),
        Adagrad::new(0.01).into(),
        Adadelta::new(1.0).into(),
        Adam::new(0.001).into(),
        Adamax::new(0.002).into(),
        Nadam::new(0.002).into(),
        PAS::new(shapes(), 0.1, 1.0, GradClip::none()).into(),
        PPAS::new(shapes(), 0.1, 1.0, GradClip::none()).into(),
    ];
    let names: Vec<_> = kinds.iter().map(Optimizer::name).collect();
    assert_eq!(
        names,
        ["SGD", "RMSprop", "Adagrad", "Adadelta", "Adam", "Adamax", "Nadam", "PAS", "PPAS"]
    );
}
