/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Optimizer trait、梯度裁剪，以及封闭的优化器枚举 OptimizerKind
 *
 * 所有优化器都遵循同一流程：
 * 1. 裁剪梯度（先按全局范数，再按元素值）
 * 2. 按各自的更新规则修改参数
 * 3. `iterations` 加 1
 */

use super::{Adadelta, Adagrad, Adam, Adamax, Nadam, PAS, PPAS, RMSprop, SGD};
use crate::nn::GraphError;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

/// 数值稳定项（与 Keras 的 `K.epsilon()` 一致）
pub const EPSILON: f32 = 1e-7;

/// 优化器 trait
///
/// 梯度由调用方（训练驱动）计算后传入，`params[i]` 与 `grads[i]` 一一对应，
/// 顺序与训练图的可训练参数顺序一致。
#[enum_dispatch]
pub trait Optimizer {
    /// 算法名称（如 "SGD"）
    fn name(&self) -> &'static str;

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, lr: f32);

    fn clip(&self) -> &GradClip;

    /// 已执行的更新次数
    fn iterations(&self) -> u64;

    /// 用已计算的梯度更新参数；`loss` 为本批次的损失值（仅 PAS 系列使用）
    fn step(&mut self, params: &mut [Tensor], grads: &[Tensor], loss: f32) -> Result<(), GraphError>;

    /// 重置累积状态（动量、迭代次数等）
    fn reset(&mut self);
}

/// 封闭的优化器集合
#[enum_dispatch(Optimizer)]
#[derive(Debug, Clone)]
pub enum OptimizerKind {
    SGD,
    RMSprop,
    Adagrad,
    Adadelta,
    Adam,
    Adamax,
    Nadam,
    PAS,
    PPAS,
}

/// 梯度裁剪设置
///
/// - `clipnorm > 0`：所有梯度的全局 L2 范数超过它时整体等比缩放
/// - `clipvalue > 0`：逐元素截断到 `[-clipvalue, clipvalue]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradClip {
    pub clipnorm: f32,
    pub clipvalue: f32,
}

impl Default for GradClip {
    fn default() -> Self {
        Self {
            clipnorm: 10.0,
            clipvalue: 0.0,
        }
    }
}

impl GradClip {
    pub const fn new(clipnorm: f32, clipvalue: f32) -> Self {
        Self {
            clipnorm,
            clipvalue,
        }
    }

    /// 不做任何裁剪
    pub const fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn apply(&self, grads: &[Tensor]) -> Vec<Tensor> {
        let mut clipped = grads.to_vec();
        if self.clipnorm > 0.0 {
            let norm = global_norm(&clipped);
            if norm > self.clipnorm {
                let scale = self.clipnorm / norm;
                for g in &mut clipped {
                    g.data_mut().mapv_inplace(|x| x * scale);
                }
            }
        }
        if self.clipvalue > 0.0 {
            let cv = self.clipvalue;
            for g in &mut clipped {
                g.data_mut().mapv_inplace(|x| x.clamp(-cv, cv));
            }
        }
        clipped
    }
}

/// 所有梯度合在一起的 L2 范数
pub fn global_norm(grads: &[Tensor]) -> f32 {
    grads.iter().map(Tensor::sum_squares).sum::<f32>().sqrt()
}

/// 检查参数与梯度数量、形状是否一一对应
pub(crate) fn check_params_and_grads(params: &[Tensor], grads: &[Tensor]) -> Result<(), GraphError> {
    if params.len() != grads.len() {
        return Err(GraphError::ShapeMismatch {
            expected: vec![params.len()],
            got: vec![grads.len()],
            message: "参数与梯度的数量不一致".to_string(),
        });
    }
    for (i, (p, g)) in params.iter().zip(grads).enumerate() {
        if !p.is_same_shape(g) {
            return Err(GraphError::ShapeMismatch {
                expected: p.shape().to_vec(),
                got: g.shape().to_vec(),
                message: format!("第{i}个参数的梯度形状不一致"),
            });
        }
    }
    Ok(())
}

/// 惰性初始化逐参数的累积状态（全零），已存在时检查形状
pub(crate) fn ensure_slots(slots: &mut Vec<Tensor>, params: &[Tensor]) -> Result<(), GraphError> {
    if slots.is_empty() {
        slots.extend(params.iter().map(|p| Tensor::zeros(p.shape())));
        return Ok(());
    }
    check_params_and_grads(slots, params)
}

/// Keras 的按迭代次数衰减：lr / (1 + decay * iterations)
pub(crate) fn decayed_lr(lr: f32, decay: f32, iterations: u64) -> f32 {
    if decay > 0.0 {
        lr / (1.0 + decay * iterations as f32)
    } else {
        lr
    }
}
