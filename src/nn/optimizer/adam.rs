/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Adam 系列优化器：Adam、Adamax、Nadam
 */

use super::core::{EPSILON, GradClip, Optimizer, check_params_and_grads, decayed_lr, ensure_slots};
use crate::nn::GraphError;
use crate::tensor::Tensor;
use ndarray::Zip;

/// Adam: Adaptive Moment Estimation
/// - m = β1 * m + (1 - β1) * g
/// - v = β2 * v + (1 - β2) * g²
/// - θ = θ - lr_t * √(1 - β2ᵗ) / (1 - β1ᵗ) * m / (√v + ε)
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    decay: f32,
    clip: GradClip,
    iterations: u64,
    /// 一阶矩估计
    m: Vec<Tensor>,
    /// 二阶矩估计
    v: Vec<Tensor>,
}

impl Adam {
    pub fn new(lr: f32) -> Self {
        Self::new_with_config(lr, 0.9, 0.999, 0.0, GradClip::none())
    }

    pub fn new_with_config(lr: f32, beta1: f32, beta2: f32, decay: f32, clip: GradClip) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            decay,
            clip,
            iterations: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    pub const fn beta1(&self) -> f32 {
        self.beta1
    }

    pub const fn beta2(&self) -> f32 {
        self.beta2
    }

    pub const fn decay(&self) -> f32 {
        self.decay
    }
}

impl Optimizer for Adam {
    fn name(&self) -> &'static str {
        "Adam"
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
        ensure_slots(&mut self.m, params)?;
        ensure_slots(&mut self.v, params)?;
        let grads = self.clip.apply(grads);
        let (b1, b2) = (self.beta1, self.beta2);
        let t = (self.iterations + 1) as i32;
        let lr = decayed_lr(self.lr, self.decay, self.iterations) * (1.0 - b2.powi(t)).sqrt()
            / (1.0 - b1.powi(t));

        for (((p, g), m), v) in params
            .iter_mut()
            .zip(&grads)
            .zip(&mut self.m)
            .zip(&mut self.v)
        {
            Zip::from(p.data_mut())
                .and(m.data_mut())
                .and(v.data_mut())
                .and(g.data())
                .for_each(|p, m, v, &g| {
                    *m = b1 * *m + (1.0 - b1) * g;
                    *v = b2 * *v + (1.0 - b2) * g * g;
                    *p -= lr * *m / (v.sqrt() + EPSILON);
                });
        }
        self.iterations += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.iterations = 0;
    }
}

/// Adamax：Adam 的无穷范数变体
/// - u = max(β2 * u, |g|)
/// - θ = θ - lr_t / (1 - β1ᵗ) * m / (u + ε)
#[derive(Debug, Clone)]
pub struct Adamax {
    lr: f32,
    beta1: f32,
    beta2: f32,
    decay: f32,
    clip: GradClip,
    iterations: u64,
    m: Vec<Tensor>,
    /// 指数加权的无穷范数
    u: Vec<Tensor>,
}

impl Adamax {
    pub fn new(lr: f32) -> Self {
        Self::new_with_config(lr, 0.9, 0.999, 0.0, GradClip::none())
    }

    pub fn new_with_config(lr: f32, beta1: f32, beta2: f32, decay: f32, clip: GradClip) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            decay,
            clip,
            iterations: 0,
            m: Vec::new(),
            u: Vec::new(),
        }
    }

    pub const fn beta1(&self) -> f32 {
        self.beta1
    }

    pub const fn beta2(&self) -> f32 {
        self.beta2
    }

    pub const fn decay(&self) -> f32 {
        self.decay
    }
}

impl Optimizer for Adamax {
    fn name(&self) -> &'static str {
        "Adamax"
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
        ensure_slots(&mut self.m, params)?;
        ensure_slots(&mut self.u, params)?;
        let grads = self.clip.apply(grads);
        let (b1, b2) = (self.beta1, self.beta2);
        let t = (self.iterations + 1) as i32;
        let lr = decayed_lr(self.lr, self.decay, self.iterations) / (1.0 - b1.powi(t));

        for (((p, g), m), u) in params
            .iter_mut()
            .zip(&grads)
            .zip(&mut self.m)
            .zip(&mut self.u)
        {
            Zip::from(p.data_mut())
                .and(m.data_mut())
                .and(u.data_mut())
                .and(g.data())
                .for_each(|p, m, u, &g| {
                    *m = b1 * *m + (1.0 - b1) * g;
                    *u = (b2 * *u).max(g.abs());
                    *p -= lr * *m / (*u + EPSILON);
                });
        }
        self.iterations += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.u.clear();
        self.iterations = 0;
    }
}

/// Nadam：带 Nesterov 动量的 Adam
///
/// 动量按 `schedule_decay` 逐步升温：μ_t = β1 * (1 - 0.5 * 0.96^(t * schedule_decay))。
/// 不使用按迭代衰减的学习率。
#[derive(Debug, Clone)]
pub struct Nadam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    schedule_decay: f32,
    clip: GradClip,
    iterations: u64,
    /// 动量系数的累乘 ∏μ_i
    m_schedule: f32,
    m: Vec<Tensor>,
    v: Vec<Tensor>,
}

impl Nadam {
    pub fn new(lr: f32) -> Self {
        Self::new_with_config(lr, 0.9, 0.999, 0.004, GradClip::none())
    }

    pub fn new_with_config(
        lr: f32,
        beta1: f32,
        beta2: f32,
        schedule_decay: f32,
        clip: GradClip,
    ) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            schedule_decay,
            clip,
            iterations: 0,
            m_schedule: 1.0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    pub const fn beta1(&self) -> f32 {
        self.beta1
    }

    pub const fn beta2(&self) -> f32 {
        self.beta2
    }

    pub const fn schedule_decay(&self) -> f32 {
        self.schedule_decay
    }

    fn momentum_cache(&self, t: f32) -> f32 {
        self.beta1 * (1.0 - 0.5 * 0.96_f32.powf(t * self.schedule_decay))
    }
}

impl Optimizer for Nadam {
    fn name(&self) -> &'static str {
        "Nadam"
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
        ensure_slots(&mut self.m, params)?;
        ensure_slots(&mut self.v, params)?;
        let grads = self.clip.apply(grads);
        let (b1, b2, lr) = (self.beta1, self.beta2, self.lr);
        let t = (self.iterations + 1) as f32;

        let mc_t = self.momentum_cache(t);
        let mc_t_1 = self.momentum_cache(t + 1.0);
        let m_schedule_new = self.m_schedule * mc_t;
        let m_schedule_next = m_schedule_new * mc_t_1;
        let v_correction = 1.0 - b2.powf(t);

        for (((p, g), m), v) in params
            .iter_mut()
            .zip(&grads)
            .zip(&mut self.m)
            .zip(&mut self.v)
        {
            Zip::from(p.data_mut())
                .and(m.data_mut())
                .and(v.data_mut())
                .and(g.data())
                .for_each(|p, m, v, &g| {
                    let g_prime = g / (1.0 - m_schedule_new);
                    *m = b1 * *m + (1.0 - b1) * g;
                    let m_prime = *m / (1.0 - m_schedule_next);
                    *v = b2 * *v + (1.0 - b2) * g * g;
                    let v_prime = *v / v_correction;
                    let m_bar = (1.0 - mc_t) * g_prime + mc_t_1 * m_prime;
                    *p -= lr * m_bar / (v_prime.sqrt() + EPSILON);
                });
        }
        self.m_schedule = m_schedule_new;
        self.iterations += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.m_schedule = 1.0;
        self.iterations = 0;
    }
}
