/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Adadelta 优化器
 */

use super::core::{EPSILON, GradClip, Optimizer, check_params_and_grads, decayed_lr, ensure_slots};
use crate::nn::GraphError;
use crate::tensor::Tensor;
use ndarray::Zip;

/// Adadelta：用更新量自身的滑动平均替代固定步长
///
/// - a = ρ * a + (1 - ρ) * g²
/// - u = g * √(d + ε) / √(a + ε)
/// - θ = θ - lr_t * u
/// - d = ρ * d + (1 - ρ) * u²
#[derive(Debug, Clone)]
pub struct Adadelta {
    lr: f32,
    rho: f32,
    decay: f32,
    clip: GradClip,
    iterations: u64,
    accumulators: Vec<Tensor>,
    delta_accumulators: Vec<Tensor>,
}

impl Adadelta {
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
            delta_accumulators: Vec::new(),
        }
    }

    pub const fn rho(&self) -> f32 {
        self.rho
    }

    pub const fn decay(&self) -> f32 {
        self.decay
    }
}

impl Optimizer for Adadelta {
    fn name(&self) -> &'static str {
        "Adadelta"
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
        ensure_slots(&mut self.delta_accumulators, params)?;
        let grads = self.clip.apply(grads);
        let lr = decayed_lr(self.lr, self.decay, self.iterations);
        let rho = self.rho;

        for (((p, g), a), d) in params
            .iter_mut()
            .zip(&grads)
            .zip(&mut self.accumulators)
            .zip(&mut self.delta_accumulators)
        {
            Zip::from(p.data_mut())
                .and(a.data_mut())
                .and(d.data_mut())
                .and(g.data())
                .for_each(|p, a, d, &g| {
                    *a = rho * *a + (1.0 - rho) * g * g;
                    let update = g * (*d + EPSILON).sqrt() / (*a + EPSILON).sqrt();
                    *p -= lr * update;
                    *d = rho * *d + (1.0 - rho) * update * update;
                });
        }
        self.iterations += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.accumulators.clear();
        self.delta_accumulators.clear();
        self.iterations = 0;
    }
}
