/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : SGD 优化器（支持动量、Nesterov 动量与按迭代衰减）
 */

use super::core::{GradClip, Optimizer, check_params_and_grads, decayed_lr, ensure_slots};
use crate::nn::GraphError;
use crate::tensor::Tensor;
use ndarray::Zip;

/// SGD 优化器
///
/// - v = momentum * v - lr_t * g
/// - 普通动量：θ = θ + v
/// - Nesterov：θ = θ + momentum * v - lr_t * g
#[derive(Debug, Clone)]
pub struct SGD {
    lr: f32,
    momentum: f32,
    decay: f32,
    nesterov: bool,
    clip: GradClip,
    iterations: u64,
    /// 速度（按参数顺序）
    velocities: Vec<Tensor>,
}

impl SGD {
    /// 创建不带动量、不裁剪的 SGD
    pub fn new(lr: f32) -> Self {
        Self::new_with_config(lr, 0.0, 0.0, false, GradClip::none())
    }

    pub fn new_with_config(
        lr: f32,
        momentum: f32,
        decay: f32,
        nesterov: bool,
        clip: GradClip,
    ) -> Self {
        Self {
            lr,
            momentum,
            decay,
            nesterov,
            clip,
            iterations: 0,
            velocities: Vec::new(),
        }
    }

    pub const fn momentum(&self) -> f32 {
        self.momentum
    }

    pub const fn decay(&self) -> f32 {
        self.decay
    }

    pub const fn nesterov(&self) -> bool {
        self.nesterov
    }
}

impl Optimizer for SGD {
    fn name(&self) -> &'static str {
        "SGD"
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
        ensure_slots(&mut self.velocities, params)?;
        let grads = self.clip.apply(grads);
        let lr = decayed_lr(self.lr, self.decay, self.iterations);
        let (momentum, nesterov) = (self.momentum, self.nesterov);

        for ((p, g), v) in params.iter_mut().zip(&grads).zip(&mut self.velocities) {
            Zip::from(p.data_mut())
                .and(v.data_mut())
                .and(g.data())
                .for_each(|p, v, &g| {
                    *v = momentum * *v - lr * g;
                    if nesterov {
                        *p += momentum * *v - lr * g;
                    } else {
                        *p += *v;
                    }
                });
        }
        self.iterations += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.velocities.clear();
        self.iterations = 0;
    }
}
