/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : GraphInner 核心操作：创建、访问器、拓扑遍历
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, NodeId};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeSet, HashMap};

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    /// 创建一个带固定种子的计算图（确保参数初始化可重复）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_name_and_seed("default_graph", seed)
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            names: HashMap::new(),
            rng: None,
        }
    }

    pub fn with_name_and_seed(name: &str, seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
            ..Self::with_name(name)
        }
    }

    // ========== 基础访问器 ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.nodes.get(i))
            .ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.nodes.get_mut(i))
            .ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn get_node_shape(&self, id: NodeId) -> Result<&DynamicShape, GraphError> {
        Ok(self.get_node(id)?.shape())
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        Ok(self.get_node(id)?.parents().to_vec())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    pub fn set_node_value(&mut self, id: NodeId, value: &Tensor) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    pub(in crate::nn::graph) fn check_duplicate_node_name(&self, name: &str) -> Result<(), GraphError> {
        if self.names.contains_key(name) {
            return Err(GraphError::DuplicateNodeName(format!(
                "节点{}在图{}中重复",
                name, self.name
            )));
        }
        Ok(())
    }

    pub(in crate::nn::graph) fn generate_valid_new_node_name(
        &self,
        base_name: &str,
        node_type: &str,
    ) -> Result<String, GraphError> {
        if !base_name.is_empty() {
            self.check_duplicate_node_name(base_name)?;
            return Ok(base_name.to_string());
        }

        let mut counter = 1;
        loop {
            let name = format!("{node_type}_{counter}");
            if self.check_duplicate_node_name(&name).is_ok() {
                return Ok(name);
            }
            counter += 1;
        }
    }

    // ========== 遍历 ==========

    /// 从 `roots` 出发沿父节点回溯，返回所有祖先（含 roots 本身），按 id 升序
    pub fn ancestors(&self, roots: &[NodeId]) -> Result<BTreeSet<NodeId>, GraphError> {
        let mut visited = BTreeSet::new();
        let mut stack = roots.to_vec();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            stack.extend_from_slice(self.get_node(id)?.parents());
        }
        Ok(visited)
    }

    /// `outputs` 依赖的可训练参数，按声明顺序排列
    pub fn trainable_parameters(&self, outputs: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut params = Vec::new();
        for id in self.ancestors(outputs)? {
            if self.get_node(id)?.is_trainable() {
                params.push(id);
            }
        }
        Ok(params)
    }

    /// `outputs` 依赖的输入节点，按声明顺序排列
    pub fn input_dependencies(&self, outputs: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut inputs = Vec::new();
        for id in self.ancestors(outputs)? {
            if self.get_node(id)?.is_input() {
                inputs.push(id);
            }
        }
        Ok(inputs)
    }
}
