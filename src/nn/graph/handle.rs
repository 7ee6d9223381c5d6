/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::GraphInner;
use crate::nn::descriptor::GraphDescriptor;
use crate::nn::var::{Init, Var};
use crate::nn::{DynamicShape, NodeId};
use std::cell::RefCell;
use std::rc::Rc;

/// Graph - 计算图句柄
///
/// # 设计原则
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    // ==================== 创建 ====================

    pub fn new() -> Self {
        Self::from_inner(GraphInner::new())
    }

    pub fn with_name(name: &str) -> Self {
        Self::from_inner(GraphInner::with_name(name))
    }

    /// 创建带种子的图（参数初始化可重复）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    pub fn with_name_and_seed(name: &str, seed: u64) -> Self {
        Self::from_inner(GraphInner::with_name_and_seed(name, seed))
    }

    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, Rc::clone(&self.inner))
    }

    /// 检查 Var 是否属于本图
    pub fn owns(&self, var: &Var) -> bool {
        Rc::ptr_eq(&self.inner, var.graph())
    }

    // ==================== 创建变量 ====================

    /// 创建符号输入（类似 Keras 的 `Input(name=..., batch_shape=...)`）
    pub fn input(&self, name: &str, shape: DynamicShape) -> Result<Var, GraphError> {
        let id = self.inner.borrow_mut().new_input_node(shape, Some(name))?;
        Ok(self.wrap_node_id(id))
    }

    /// 创建可训练参数
    pub fn parameter(&self, name: &str, shape: &[usize], init: Init) -> Result<Var, GraphError> {
        let id = self
            .inner
            .borrow_mut()
            .new_parameter_node(shape, &init, true, Some(name))?;
        Ok(self.wrap_node_id(id))
    }

    /// 创建冻结（不可训练）参数
    pub fn frozen_parameter(
        &self,
        name: &str,
        shape: &[usize],
        init: Init,
    ) -> Result<Var, GraphError> {
        let id = self
            .inner
            .borrow_mut()
            .new_parameter_node(shape, &init, false, Some(name))?;
        Ok(self.wrap_node_id(id))
    }

    /// 创建一般运算节点
    pub fn operation(
        &self,
        op: &str,
        parents: &[&Var],
        shape: DynamicShape,
        name: Option<&str>,
    ) -> Result<Var, GraphError> {
        let parent_ids = self.collect_ids(parents)?;
        let id = self
            .inner
            .borrow_mut()
            .new_operation_node(op, &parent_ids, shape, name)?;
        Ok(self.wrap_node_id(id))
    }

    /// 创建损失节点：以 `args` 为参数调用名为 `loss` 的损失函数
    pub fn loss(&self, loss: &str, args: &[&Var], shape: DynamicShape) -> Result<Var, GraphError> {
        let parent_ids = self.collect_ids(args)?;
        let id = self
            .inner
            .borrow_mut()
            .new_loss_node(loss, &parent_ids, shape, None)?;
        Ok(self.wrap_node_id(id))
    }

    fn collect_ids(&self, vars: &[&Var]) -> Result<Vec<NodeId>, GraphError> {
        vars.iter()
            .map(|v| {
                if self.owns(v) {
                    Ok(v.node_id())
                } else {
                    Err(GraphError::InvalidOperation(format!(
                        "节点{}不属于图{}",
                        v.node_id(),
                        self.inner.borrow().name()
                    )))
                }
            })
            .collect()
    }

    // ==================== 查询 ====================

    pub fn name(&self) -> String {
        self.inner.borrow().name().to_string()
    }

    pub fn nodes_count(&self) -> usize {
        self.inner.borrow().nodes_count()
    }

    pub fn describe(&self) -> GraphDescriptor {
        self.inner.borrow().describe()
    }
}
