/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 张量：对 ndarray 动态维数组的薄封装。
 *                 参数节点用它保存权重，优化器用它保存梯度和累积状态。
 */

use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量。
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则会panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        let expected: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected,
            "数据长度{}与形状{:?}不匹配",
            data.len(),
            shape
        );
        Self {
            data: Array::from_shape_vec(IxDyn(shape), data.to_vec()).unwrap(),
        }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::full(1.0, shape)
    }

    /// 创建所有元素都为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: ArrayD::from_elem(IxDyn(shape), value),
        }
    }

    /// 正态分布随机张量（使用线程 RNG）
    pub fn normal(mean: f32, std_dev: f32, shape: &[usize]) -> Self {
        let mut rng = rand::thread_rng();
        Self::normal_from(mean, std_dev, shape, &mut rng)
    }

    /// 正态分布随机张量（使用指定的 RNG，保证可重复）
    pub fn normal_with_rng(mean: f32, std_dev: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        Self::normal_from(mean, std_dev, shape, rng)
    }

    // Box-Muller 变换
    fn normal_from<R: Rng>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Self {
        let len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(len);
        while data.len() < len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();
            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < len && z1.is_finite() {
                data.push(z1);
            }
        }
        Self::new(&data, shape)
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 转化为纯数：仅含一个元素时返回 Some
    pub fn number(&self) -> Option<f32> {
        if self.size() == 1 {
            self.data.iter().next().copied()
        } else {
            None
        }
    }

    pub const fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub const fn data_mut(&mut self) -> &mut ArrayD<f32> {
        &mut self.data
    }

    /// 所有元素的平方和
    pub fn sum_squares(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum()
    }

    /// 所有元素的均值（空张量返回0）
    pub fn mean(&self) -> f32 {
        if self.size() == 0 {
            0.0
        } else {
            self.data.sum() / self.size() as f32
        }
    }
}

