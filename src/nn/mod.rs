/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 符号计算图：节点、变量、函数式模型与优化器
 */

mod descriptor;
mod graph;
mod model;
mod module;
mod nodes;
pub mod optimizer;
mod shape;
mod var;

pub use descriptor::{GraphDescriptor, NodeDescriptor, NodeTypeDescriptor};
pub use graph::{Graph, GraphError, GraphInner};
pub use model::{
    CompileOptions, CompiledModel, LossEntry, Model, Reduction, SampleWeightMode, WeightShape,
};
pub use module::Module;
pub use nodes::{NodeHandle, NodeId, NodeType};
pub use optimizer::{Optimizer, OptimizerKind};
pub use shape::{Dim, DynamicShape};
pub use var::{Init, Var};

#[cfg(test)]
mod tests;
