/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Graph 模块的错误类型
 */

use crate::nn::NodeId;
use thiserror::Error;

/// Graph 操作错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("节点{0}不存在")]
    NodeNotFound(NodeId),
    #[error("节点名称重复：{0}")]
    DuplicateNodeName(String),
    #[error("非法操作：{0}")]
    InvalidOperation(String),
    #[error("形状不匹配（期望{expected:?}，实际{got:?}）：{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("图不连通：输出依赖的输入节点`{0}`不在模型输入列表中")]
    Disconnected(String),
    #[error("计算错误：{0}")]
    ComputationError(String),
}
