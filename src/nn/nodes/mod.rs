/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 计算图节点：输入、参数、运算和损失四类
 */

use super::DynamicShape;
use super::graph::GraphError;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 节点 ID，按声明顺序递增分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 节点类型
#[derive(Debug, Clone)]
pub enum NodeType {
    /// 符号输入（值由训练驱动在运行时喂入）
    Input,
    /// 参数（权重），`trainable == false` 表示冻结
    Parameter { value: Tensor, trainable: bool },
    /// 基础模型内部的一般运算，仅记录算子名
    Operation { op: String },
    /// 按名称调用的损失函数，输出每个样本的损失
    Loss { loss: String },
}

impl NodeType {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Parameter { .. } => "Parameter",
            Self::Operation { .. } => "Operation",
            Self::Loss { .. } => "Loss",
        }
    }
}

pub struct NodeHandle {
    id: NodeId,
    name: String,
    node_type: NodeType,
    shape: DynamicShape,
    parents: Vec<NodeId>,
}

impl NodeHandle {
    pub(in crate::nn) const fn new(
        id: NodeId,
        name: String,
        node_type: NodeType,
        shape: DynamicShape,
        parents: Vec<NodeId>,
    ) -> Self {
        Self {
            id,
            name,
            node_type,
            shape,
            parents,
        }
    }

    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    pub const fn shape(&self) -> &DynamicShape {
        &self.shape
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub const fn is_input(&self) -> bool {
        matches!(self.node_type, NodeType::Input)
    }

    pub const fn is_trainable(&self) -> bool {
        matches!(
            self.node_type,
            NodeType::Parameter {
                trainable: true,
                ..
            }
        )
    }

    /// 只有参数节点持有值
    pub const fn value(&self) -> Option<&Tensor> {
        match &self.node_type {
            NodeType::Parameter { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn set_value(&mut self, new_value: &Tensor) -> Result<(), GraphError> {
        let NodeType::Parameter { value, .. } = &mut self.node_type else {
            return Err(GraphError::InvalidOperation(format!(
                "节点`{}`不是参数节点，不能设置值",
                self.name
            )));
        };
        if !value.is_same_shape(new_value) {
            return Err(GraphError::ShapeMismatch {
                expected: value.shape().to_vec(),
                got: new_value.shape().to_vec(),
                message: format!("参数节点`{}`的新值形状不一致", self.name),
            });
        }
        *value = new_value.clone();
        Ok(())
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "节点[id={}, name={}, type={}]",
            self.id.0,
            self.name,
            self.node_type.type_name()
        )
    }
}
