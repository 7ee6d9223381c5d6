/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 在线训练的自定义损失：封闭的损失注册表与各损失的图布局
 *
 * 每种损失对应一张布局表：需要追加的辅助输入（按顺序）、
 * 损失函数的参数顺序、损失输出的形状。构建器按表通用地拼图。
 */

use super::params::LossSpec;
use crate::errors::OnlineError;
use crate::nn::{DynamicShape, LossEntry};
use std::fmt;

/// 支持的自定义损失
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LossKind {
    LogDiff,
    WeightedLogDiff,
    LogDiffPlusCategoricalCrossentropy,
    LinearInterpolationCategoricalCrossentropy,
    HybridLogDiff,
}

impl LossKind {
    pub const ALL: [Self; 5] = [
        Self::LogDiff,
        Self::WeightedLogDiff,
        Self::LogDiffPlusCategoricalCrossentropy,
        Self::LinearInterpolationCategoricalCrossentropy,
        Self::HybridLogDiff,
    ];

    /// 按损失名查找（区分大小写，与配置中的名称一一对应）
    pub fn from_name(name: &str) -> Result<Self, OnlineError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| OnlineError::UnsupportedLoss(name.to_string()))
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::LogDiff => "log_diff",
            Self::WeightedLogDiff => "weighted_log_diff",
            Self::LogDiffPlusCategoricalCrossentropy => "log_diff_plus_categorical_crossentropy",
            Self::LinearInterpolationCategoricalCrossentropy => {
                "linear_interpolation_categorical_crossentropy"
            }
            Self::HybridLogDiff => "hybrid_log_diff",
        }
    }

    /// 该损失的图布局
    pub fn layout(&self) -> LossLayout {
        use AuxInput::{MetricValue, Scalar, Sequence, StateBelow};
        use LossArg::{Aux, Prediction, Rescored};

        match self {
            Self::LogDiff => LossLayout {
                inputs: vec![StateBelow("state_below_h"), Sequence("yref"), Sequence("hyp")],
                args: vec![Aux("yref"), Prediction, Aux("hyp"), Rescored("state_below_h")],
                output: LossOutput::PerSample,
            },
            Self::WeightedLogDiff => LossLayout {
                inputs: vec![
                    StateBelow("state_below_h"),
                    Scalar("weight"),
                    Sequence("yref"),
                    Sequence("hyp"),
                ],
                args: vec![
                    Aux("yref"),
                    Prediction,
                    Aux("hyp"),
                    Rescored("state_below_h"),
                    Aux("weight"),
                ],
                output: LossOutput::PerSample,
            },
            Self::LogDiffPlusCategoricalCrossentropy => LossLayout {
                inputs: vec![
                    StateBelow("state_below_h1"),
                    StateBelow("state_below_h2"),
                    Scalar("weight"),
                    Sequence("yref"),
                    Sequence("hyp1"),
                    Sequence("hyp2"),
                ],
                args: vec![
                    Aux("yref"),
                    Prediction,
                    Aux("hyp1"),
                    Rescored("state_below_h1"),
                    Aux("hyp2"),
                    Rescored("state_below_h2"),
                    Aux("weight"),
                ],
                output: LossOutput::PerSample,
            },
            Self::LinearInterpolationCategoricalCrossentropy => LossLayout {
                inputs: vec![Sequence("yref"), MetricValue("metric_value"), Scalar("weight")],
                args: vec![Aux("yref"), Prediction, Aux("metric_value"), Aux("weight")],
                output: LossOutput::Flat,
            },
            Self::HybridLogDiff => LossLayout {
                inputs: vec![
                    StateBelow("state_below_h1"),
                    Sequence("yref"),
                    Sequence("hyp1"),
                    Scalar("weight1"),
                    Scalar("weight2"),
                    Scalar("p_ty"),
                ],
                args: vec![
                    Aux("yref"),
                    Prediction,
                    Aux("hyp1"),
                    Rescored("state_below_h1"),
                    Aux("weight1"),
                    Aux("weight2"),
                    Aux("p_ty"),
                ],
                output: LossOutput::Flat,
            },
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 训练图追加的辅助输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxInput {
    /// 解码器输入（目标前移一位）：`[?, ?]`
    StateBelow(&'static str),
    /// 参考译文或假设译文的 one-hot 序列：`[?, ?, ?]`
    Sequence(&'static str),
    /// 评价指标值：`[?, 1]`
    MetricValue(&'static str),
    /// 标量权重或概率：`[?, 1]`
    Scalar(&'static str),
}

impl AuxInput {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StateBelow(name)
            | Self::Sequence(name)
            | Self::MetricValue(name)
            | Self::Scalar(name) => name,
        }
    }

    pub fn shape(&self) -> DynamicShape {
        match self {
            Self::StateBelow(_) => DynamicShape::unknown(2),
            Self::Sequence(_) => DynamicShape::unknown(3),
            Self::MetricValue(_) | Self::Scalar(_) => DynamicShape::with_dynamic_batch(&[1]),
        }
    }
}

/// 损失函数的一个参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossArg {
    /// 按名称引用的辅助输入
    Aux(&'static str),
    /// 基础模型对原始输入的预测（`preds_y`）
    Prediction,
    /// 以给定的解码器输入重新调用基础模型得到的预测（`preds_h*`）
    Rescored(&'static str),
}

/// 损失输出形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossOutput {
    /// `[?, 1]`
    PerSample,
    /// `[?]`
    Flat,
}

impl LossOutput {
    pub fn shape(&self) -> DynamicShape {
        match self {
            Self::PerSample => DynamicShape::with_dynamic_batch(&[1]),
            Self::Flat => DynamicShape::unknown(1),
        }
    }
}

/// 一种损失的图布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossLayout {
    pub inputs: Vec<AuxInput>,
    pub args: Vec<LossArg>,
    pub output: LossOutput,
}

impl LossLayout {
    /// 需要重新调用基础模型的次数
    pub fn secondary_passes(&self) -> usize {
        self.args
            .iter()
            .filter(|arg| matches!(arg, LossArg::Rescored(_)))
            .count()
    }
}

/// 解析后的损失映射与损失权重
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLoss {
    pub entries: Vec<LossEntry>,
    pub weights: Option<Vec<f32>>,
}

/// 解析 LOSS 与 LOSS_WEIGHTS
///
/// - 单个损失：一项恒等映射，无权重
/// - 损失列表：每个损失一项；未给权重时取均匀的 `1/N` 并告警，
///   权重个数与损失个数不一致时报错
pub fn resolve_losses(
    loss: &LossSpec,
    loss_weights: Option<&[f32]>,
) -> Result<ResolvedLoss, OnlineError> {
    match loss {
        LossSpec::Single(name) => Ok(ResolvedLoss {
            entries: vec![LossEntry::identity(name)],
            weights: None,
        }),
        LossSpec::Multi(names) => {
            let entries: Vec<_> = names.iter().map(|n| LossEntry::identity(n)).collect();
            let weights = match loss_weights {
                Some(ws) if ws.len() == names.len() => ws.to_vec(),
                Some(ws) => {
                    return Err(OnlineError::LossWeightMismatch {
                        losses: names.len(),
                        weights: ws.len(),
                    });
                }
                None => {
                    log::warn!("未设置 LOSS_WEIGHTS，{}个损失使用相同的权重", names.len());
                    vec![1.0 / names.len() as f32; names.len()]
                }
            };
            Ok(ResolvedLoss {
                entries,
                weights: Some(weights),
            })
        }
    }
}
