/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : GraphInner 节点构建方法（new_*_node）
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::nodes::{NodeHandle, NodeType};
use crate::nn::{DynamicShape, Init, NodeId};

impl GraphInner {
    /// 添加节点到列表（父节点必须已存在）
    fn add_node_to_list(
        &mut self,
        node_type: NodeType,
        shape: DynamicShape,
        name: Option<&str>,
        type_prefix: &str,
        parents: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        for &parent_id in parents {
            self.get_node(parent_id)?;
        }
        let node_name = self.generate_valid_new_node_name(name.unwrap_or(""), type_prefix)?;
        let node_id = NodeId(self.nodes.len() as u64);

        self.names.insert(node_name.clone(), node_id);
        self.nodes.push(NodeHandle::new(
            node_id,
            node_name,
            node_type,
            shape,
            parents.to_vec(),
        ));
        Ok(node_id)
    }

    /// 创建符号输入节点
    pub fn new_input_node(
        &mut self,
        shape: DynamicShape,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.add_node_to_list(NodeType::Input, shape, name, "input", &[])
    }

    /// 创建参数节点，按 `init` 策略初始化（图有种子时结果可重复）
    pub fn new_parameter_node(
        &mut self,
        shape: &[usize],
        init: &Init,
        trainable: bool,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        if shape.is_empty() || shape.contains(&0) {
            return Err(GraphError::InvalidOperation(format!(
                "参数形状{shape:?}非法：维度不能为空或为0"
            )));
        }
        let value = match self.rng.as_mut() {
            Some(rng) => init.generate_with_rng(shape, rng),
            None => init.generate(shape),
        };
        self.add_node_to_list(
            NodeType::Parameter { value, trainable },
            DynamicShape::fixed(shape),
            name,
            "parameter",
            &[],
        )
    }

    /// 创建一般运算节点
    pub fn new_operation_node(
        &mut self,
        op: &str,
        parents: &[NodeId],
        shape: DynamicShape,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        if parents.is_empty() {
            return Err(GraphError::InvalidOperation(format!(
                "运算节点`{op}`至少需要1个父节点"
            )));
        }
        self.add_node_to_list(
            NodeType::Operation { op: op.to_string() },
            shape,
            name,
            op,
            parents,
        )
    }

    /// 创建损失节点（节点名默认即为损失名）
    pub fn new_loss_node(
        &mut self,
        loss: &str,
        parents: &[NodeId],
        shape: DynamicShape,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        if parents.is_empty() {
            return Err(GraphError::InvalidOperation(format!(
                "损失节点`{loss}`至少需要1个父节点"
            )));
        }
        self.add_node_to_list(
            NodeType::Loss {
                loss: loss.to_string(),
            },
            shape,
            Some(name.unwrap_or(loss)),
            "loss",
            parents,
        )
    }
}
