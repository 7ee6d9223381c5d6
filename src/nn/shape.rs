/*
 * DynamicShape: 支持动态维度的形状系统
 *
 * 类似 Keras 的 batch_shape=(None, None, 128)：某些维度在建图时未知，
 * 例如 batch 维度和序列长度。符号输入节点都用它描述形状。
 *
 * # 示例
 * ```
 * use online_nmt::nn::DynamicShape;
 *
 * let seq = DynamicShape::unknown(3);
 * assert_eq!(seq.to_string(), "[?, ?, ?]");
 *
 * let scalar_per_sample = DynamicShape::with_dynamic_batch(&[1]);
 * assert_eq!(scalar_per_sample.to_string(), "[?, 1]");
 * ```
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// 维度值：Some(n) 表示固定值 n，None 表示动态（任意值）
pub type Dim = Option<usize>;

/// 动态形状：某些维度可以是 None，表示"任意值"
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicShape {
    dims: Vec<Dim>,
}

impl DynamicShape {
    pub fn new(dims: &[Dim]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }

    /// 所有维度都确定的形状
    pub fn fixed(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().map(|&d| Some(d)).collect(),
        }
    }

    /// `ndim` 个维度全部动态
    pub fn unknown(ndim: usize) -> Self {
        Self {
            dims: vec![None; ndim],
        }
    }

    /// 第一维（batch）动态，其余维度固定
    pub fn with_dynamic_batch(feature_dims: &[usize]) -> Self {
        let mut dims = vec![None];
        dims.extend(feature_dims.iter().map(|&d| Some(d)));
        Self { dims }
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// 获取指定维度的值，越界或动态均返回 None
    pub fn dim(&self, index: usize) -> Dim {
        self.dims.get(index).copied().flatten()
    }

    pub fn is_dynamic(&self, index: usize) -> bool {
        self.dims.get(index).is_some_and(Option::is_none)
    }

    /// 若所有维度固定，则转为 `Vec<usize>`
    pub fn to_vec_fixed(&self) -> Option<Vec<usize>> {
        self.dims.iter().copied().collect()
    }

    /// 检查一个具体形状是否满足本形状（动态维度匹配任意值）
    pub fn accepts(&self, shape: &[usize]) -> bool {
        self.dims.len() == shape.len()
            && self
                .dims
                .iter()
                .zip(shape)
                .all(|(d, &s)| d.is_none_or(|d| d == s))
    }
}

impl fmt::Display for DynamicShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .dims
            .iter()
            .map(|d| d.map_or_else(|| "?".to_string(), |n| n.to_string()))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl From<&[usize]> for DynamicShape {
    fn from(dims: &[usize]) -> Self {
        Self::fixed(dims)
    }
}
