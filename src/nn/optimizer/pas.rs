/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : PAS 系列优化器（被动-攻击式步长），用于逐句在线学习
 *
 * 与其他优化器不同，PAS 系列在构造时就拿到训练图的权重形状列表，
 * 每一步都按该列表校验参数与梯度，因此列表顺序必须与可训练参数顺序一致。
 */

use super::core::{EPSILON, GradClip, Optimizer, check_params_and_grads};
use crate::nn::{GraphError, WeightShape};
use crate::tensor::Tensor;
use ndarray::Zip;

/// 按权重形状列表校验参数
fn check_weight_shapes(shapes: &[WeightShape], params: &[Tensor]) -> Result<(), GraphError> {
    if shapes.len() != params.len() {
        return Err(GraphError::ShapeMismatch {
            expected: vec![shapes.len()],
            got: vec![params.len()],
            message: "参数数量与权重形状列表不一致".to_string(),
        });
    }
    for (ws, p) in shapes.iter().zip(params) {
        if ws.shape != p.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: ws.shape.clone(),
                got: p.shape().to_vec(),
                message: format!("参数`{}`的形状与权重形状列表不一致", ws.name),
            });
        }
    }
    Ok(())
}

/// 被动-攻击式步长：τ = min(C, loss / (‖g‖² + ε))
fn pa_step_size(c: f32, loss: f32, grads: &[Tensor]) -> f32 {
    let sq_norm: f32 = grads.iter().map(Tensor::sum_squares).sum();
    c.min(loss.max(0.0) / (sq_norm + EPSILON))
}

/// PAS：θ = θ - lr * τ * g
///
/// 损失为0时不更新（"被动"），损失越大步长越大，但不超过 C（"攻击"的上限）。
#[derive(Debug, Clone)]
pub struct PAS {
    lr: f32,
    c: f32,
    clip: GradClip,
    iterations: u64,
    weight_shapes: Vec<WeightShape>,
}

impl PAS {
    pub fn new(weight_shapes: Vec<WeightShape>, lr: f32, c: f32, clip: GradClip) -> Self {
        Self {
            lr,
            c,
            clip,
            iterations: 0,
            weight_shapes,
        }
    }

    pub const fn c(&self) -> f32 {
        self.c
    }

    pub fn weight_shapes(&self) -> &[WeightShape] {
        &self.weight_shapes
    }
}

impl Optimizer for PAS {
    fn name(&self) -> &'static str {
        "PAS"
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn clip(&self) -> &GradClip {
        &self.clip
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn step(&mut self, params: &mut [Tensor], grads: &[Tensor], loss: f32) -> Result<(), GraphError> {
        check_weight_shapes(&self.weight_shapes, params)?;
        check_params_and_grads(params, grads)?;
        let grads = self.clip.apply(grads);
        let scale = self.lr * pa_step_size(self.c, loss, &grads);

        for (p, g) in params.iter_mut().zip(&grads) {
            Zip::from(p.data_mut())
                .and(g.data())
                .for_each(|p, &g| *p -= scale * g);
        }
        self.iterations += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.iterations = 0;
    }
}

/// PPAS：带近端项的 PAS
///
/// θ = θ - lr * τ * g - (lr / C) * (θ - θ₀)
///
/// θ₀ 为第一次更新前的权重，缓冲区在构造时按权重形状列表分配，
/// 第一次 `step` 时填入。近端项让在线更新不至于远离初始模型。
#[derive(Debug, Clone)]
pub struct PPAS {
    lr: f32,
    c: f32,
    clip: GradClip,
    iterations: u64,
    weight_shapes: Vec<WeightShape>,
    anchors: Vec<Tensor>,
}

impl PPAS {
    pub fn new(weight_shapes: Vec<WeightShape>, lr: f32, c: f32, clip: GradClip) -> Self {
        let anchors = weight_shapes
            .iter()
            .map(|ws| Tensor::zeros(&ws.shape))
            .collect();
        Self {
            lr,
            c,
            clip,
            iterations: 0,
            weight_shapes,
            anchors,
        }
    }

    pub const fn c(&self) -> f32 {
        self.c
    }

    pub fn weight_shapes(&self) -> &[WeightShape] {
        &self.weight_shapes
    }

    /// 近端项的锚点权重 θ₀（第一次更新前为全零）
    pub fn anchors(&self) -> &[Tensor] {
        &self.anchors
    }
}

impl Optimizer for PPAS {
    fn name(&self) -> &'static str {
        "PPAS"
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn clip(&self) -> &GradClip {
        &self.clip
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn step(&mut self, params: &mut [Tensor], grads: &[Tensor], loss: f32) -> Result<(), GraphError> {
        check_weight_shapes(&self.weight_shapes, params)?;
        check_params_and_grads(params, grads)?;
        if self.iterations == 0 {
            self.anchors = params.to_vec();
        }
        let grads = self.clip.apply(grads);
        let scale = self.lr * pa_step_size(self.c, loss, &grads);
        let proximal = if self.c > 0.0 { self.lr / self.c } else { 0.0 };

        for ((p, g), w0) in params.iter_mut().zip(&grads).zip(&self.anchors) {
            Zip::from(p.data_mut())
                .and(g.data())
                .and(w0.data())
                .for_each(|p, &g, &w0| {
                    *p -= scale * g + proximal * (*p - w0);
                });
        }
        self.iterations += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.anchors = self
            .weight_shapes
            .iter()
            .map(|ws| Tensor::zeros(&ws.shape))
            .collect();
        self.iterations = 0;
    }
}
