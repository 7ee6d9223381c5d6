/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 在线训练的配置项（与训练脚本共用大写键名的 JSON 配置）
 */

use crate::errors::OnlineError;
use crate::nn::WeightShape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// 未配置 LOSS 时的默认损失名
pub const DEFAULT_LOSS: &str = "categorical_crossentropy";

/// LOSS 配置：单个损失名，或多目标损失名列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LossSpec {
    Single(String),
    Multi(Vec<String>),
}

impl Default for LossSpec {
    fn default() -> Self {
        Self::Single(DEFAULT_LOSS.to_string())
    }
}

impl fmt::Display for LossSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => write!(f, "{name}"),
            Self::Multi(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

impl From<&str> for LossSpec {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

/// 在线训练配置
///
/// 除 `OPTIMIZER` 外都是可选项，缺省值见各优化器与构建器的说明。
/// 构建器只读取本配置，解析出的损失映射、损失权重、权重形状
/// 都放在返回值里，不会写回这里。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OnlineParams {
    /// 优化器名称（不区分大小写）
    pub optimizer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lr: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<LossSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_weights: Option<Vec<f32>>,
    /// 按全局范数裁剪梯度的阈值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_c: Option<f32>,
    /// 按元素值裁剪梯度的阈值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_v: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lr_optimizer_decay: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub momentum: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nesterov_momentum: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rho: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta_1: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta_2: Option<f32>,
    /// PAS 系列的攻击性上限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<f32>,
    #[serde(default)]
    pub use_custom_loss: bool,
    #[serde(default)]
    pub keras_metrics: Vec<String>,
    /// 直接选择 PAS 系列优化器时使用的权重形状
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_shapes: Option<Vec<WeightShape>>,
    #[serde(default)]
    pub verbose: u32,
}

impl OnlineParams {
    /// 只指定优化器，其余全部取缺省值
    pub fn new(optimizer: &str) -> Self {
        Self {
            optimizer: optimizer.to_string(),
            lr: None,
            loss: None,
            loss_weights: None,
            clip_c: None,
            clip_v: None,
            lr_optimizer_decay: None,
            momentum: None,
            nesterov_momentum: None,
            rho: None,
            beta_1: None,
            beta_2: None,
            c: None,
            use_custom_loss: false,
            keras_metrics: Vec::new(),
            weight_shapes: None,
            verbose: 0,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, OnlineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OnlineError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, OnlineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 生效的 LOSS（未配置时为 `categorical_crossentropy`）
    pub fn loss_or_default(&self) -> LossSpec {
        self.loss.clone().unwrap_or_default()
    }
}
