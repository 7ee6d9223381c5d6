/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : RMSprop 优化器
 */

use super::core::{EPSILON, GradClip, Optimizer, check_params_and_grads, decayed_lr, ensure_slots};
use crate::nn::GraphError;
use crate::tensor::Tensor;
use ndarray::Zip;

/// RMSprop：梯度平方的滑动平均做分母
///
/// - a = ρ * a + (1 - ρ) * g²
/// - θ = θ - lr_t * g / (√a + ε)
#[derive(Debug, Clone)]
pub struct RMSprop {
    lr: f32,
    rho: f32,
    decay: f32,
    clip: GradClip,
    iterations: u64,
    accumulators: Vec<Tensor>,
}

impl RMSprop {
    pub fn new(lr: f32) -> Self {
        Self::new_with_config(lr, 0.9, 0.0, GradClip::none())
    }

    pub fn new_with_config(lr: f32, rho: f32, decay: f32, clip: GradClip) -> Self {
        Self {
            lr,
            rho,
            decay,
            clip,
            iterations: 0,
            accumulators: Vec::new(),
        }
    }

    pub const fn rho(&self) -> f32 {
        self.rho
    }

    pub const fn decay(&self) -> f32 {
        self.decay
    }
}

impl Optimizer for RMSprop {
    fn name(&self) -> &'static str {
        "RMSprop"
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

    fn step(&mut self, params: &mut [Tensor], grads: &[Tensor], _loss: f32) -> Result<(), GraphError> {
        check_params_and_grads(params, grads)?;
        ensure_slots(&mut self.accumulators, params)?;
        let grads = self.clip.apply(grads);
        let lr = decayed_lr(self.lr, self.decay, self.iterations);
        let rho = self.rho;

        for ((p, g), a) in params.iter_mut().zip(&grads).zip(&mut self.accumulators) {
            Zip::from(p.data_mut())
                .and(a.data_mut())
                .and(g.data())
                .for_each(|p, a, &g| {
                    *a = rho * *a + (1.0 - rho) * g * g;
                    *p -= lr * g / (a.sqrt() + EPSILON);
                });
        }
        self.iterations += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.accumulators.clear();
        self.iterations = 0;
    }
}
