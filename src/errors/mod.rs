/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 在线训练组装过程中的错误类型
 */

use crate::nn::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OnlineError {
    #[error("不支持的优化器：{0}")]
    UnsupportedOptimizer(String),
    #[error("不支持的损失：{0}")]
    UnsupportedLoss(String),
    #[error("损失权重数量{weights}与损失数量{losses}不一致，须为每个损失提供一个权重")]
    LossWeightMismatch { losses: usize, weights: usize },
    #[error("优化器{optimizer}缺少必需的超参数{key}")]
    MissingHyperparameter { optimizer: String, key: String },
    #[error("配置解析失败：{0}")]
    Config(#[from] serde_json::Error),
    #[error("读取配置失败：{0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// 组装失败：错误连同调用方交入的全部基础模型一并交还
#[derive(Error)]
#[error("{error}")]
pub struct BuildFailure<M> {
    #[source]
    pub error: OnlineError,
    pub models: Vec<M>,
}

impl<M> BuildFailure<M> {
    pub const fn new(error: OnlineError, models: Vec<M>) -> Self {
        Self { error, models }
    }
}

impl<M> std::fmt::Debug for BuildFailure<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildFailure")
            .field("error", &self.error)
            .field("models", &self.models.len())
            .finish()
    }
}

impl<M> From<BuildFailure<M>> for OnlineError {
    fn from(failure: BuildFailure<M>) -> Self {
        failure.error
    }
}
