/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Var - 符号变量句柄（节点 ID + 图引用）
 */

use super::graph::{Graph, GraphError, GraphInner};
use super::{DynamicShape, NodeId};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Xavier/Glorot 初始化（适用于 Tanh/Softmax 前的投影）
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用线程 RNG）
    pub fn generate(&self, shape: &[usize]) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::normal(*mean, *std, shape),
            Self::Xavier => Tensor::normal(0.0, Self::xavier_std(shape), shape),
        }
    }

    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut rand::rngs::StdRng) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Xavier => Tensor::normal_with_rng(0.0, Self::xavier_std(shape), shape, rng),
        }
    }

    fn xavier_std(shape: &[usize]) -> f32 {
        let fan_in = shape.first().copied().unwrap_or(1);
        let fan_out = shape.get(1).copied().unwrap_or(1);
        (2.0 / (fan_in + fan_out) as f32).sqrt()
    }
}

// ==================== Var 结构 ====================

/// 符号变量句柄
///
/// 持有 `Rc<RefCell<GraphInner>>`，Clone 开销极低。
/// 同一个图上的所有 Var 共享参数，因此在 Var 上重新调用基础模型
/// 得到的新输出与原输出使用同一组权重。
#[derive(Clone)]
pub struct Var {
    id: NodeId,
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.same_graph(other)
    }
}

impl Eq for Var {}

impl Var {
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    pub(crate) const fn graph(&self) -> &Rc<RefCell<GraphInner>> {
        &self.graph
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph 句柄
    pub fn get_graph(&self) -> Graph {
        Graph::from_rc(Rc::clone(&self.graph))
    }

    pub fn name(&self) -> Result<String, GraphError> {
        Ok(self.graph.borrow().get_node_name(self.id)?.to_string())
    }

    pub fn shape(&self) -> Result<DynamicShape, GraphError> {
        Ok(self.graph.borrow().get_node_shape(self.id)?.clone())
    }

    /// 参数节点的当前值（其余节点返回 None）
    pub fn value(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.cloned())
    }

    pub fn is_input(&self) -> Result<bool, GraphError> {
        Ok(self.graph.borrow().get_node(self.id)?.is_input())
    }
}
