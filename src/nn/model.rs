/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 函数式模型（类似 Keras 的 `Model(inputs, outputs)`）及其编译结果
 *
 * - `Model`：指定输入列表与单个输出，校验连通性，收集可训练参数
 * - `Model::compile`：绑定优化器、损失映射、损失权重和评估指标，得到 `CompiledModel`
 */

use super::graph::{Graph, GraphError};
use super::optimizer::{Optimizer, OptimizerKind};
use super::{GraphDescriptor, Module, NodeId, Var};
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 一个可训练参数的名称与形状
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightShape {
    pub name: String,
    pub shape: Vec<usize>,
}

impl WeightShape {
    pub fn new(name: &str, shape: &[usize]) -> Self {
        Self {
            name: name.to_string(),
            shape: shape.to_vec(),
        }
    }
}

/// 损失输出的归约方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reduction {
    /// 直接使用预测值：损失节点已经算好了每个样本的损失
    #[default]
    Identity,
}

impl Reduction {
    /// 将一个输出归约为每批次的标量损失（对逐样本损失取平均）
    pub fn reduce(&self, y_pred: &Tensor) -> f32 {
        match self {
            Self::Identity => y_pred.mean(),
        }
    }
}

/// 损失映射中的一项：损失名 -> 归约方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossEntry {
    pub name: String,
    pub reduction: Reduction,
}

impl LossEntry {
    /// 恒等归约的损失项
    pub fn identity(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reduction: Reduction::Identity,
        }
    }
}

/// 样本加权模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleWeightMode {
    /// 逐时间步加权
    Temporal,
}

/// 编译选项
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub optimizer: OptimizerKind,
    /// 每个输出一项
    pub losses: Vec<LossEntry>,
    /// None 表示每项权重为1
    pub loss_weights: Option<Vec<f32>>,
    pub sample_weight_mode: Option<SampleWeightMode>,
    pub metrics: Vec<String>,
}

/// 函数式模型
#[derive(Clone)]
pub struct Model {
    name: String,
    graph: Graph,
    inputs: Vec<Var>,
    output: Var,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish()
    }
}

impl Model {
    /// 创建模型
    ///
    /// # 校验
    /// - 所有输入与输出属于同一个图
    /// - 每个输入都是输入节点，且不重复
    /// - 输出依赖的每个输入节点都在 `inputs` 中（否则图不连通）
    pub fn new(name: &str, inputs: Vec<Var>, output: Var) -> Result<Self, GraphError> {
        let graph = output.get_graph();
        let mut seen = HashSet::new();
        {
            let g = graph.inner();
            for input in &inputs {
                if !input.same_graph(&output) {
                    return Err(GraphError::InvalidOperation(format!(
                        "模型`{name}`的输入{}与输出不在同一个图中",
                        input.node_id()
                    )));
                }
                let node = g.get_node(input.node_id())?;
                if !node.is_input() {
                    return Err(GraphError::InvalidOperation(format!(
                        "模型`{name}`的输入列表中包含非输入节点：{node}"
                    )));
                }
                if !seen.insert(input.node_id()) {
                    return Err(GraphError::DuplicateNodeName(format!(
                        "模型`{name}`的输入`{}`出现了多次",
                        node.name()
                    )));
                }
            }
            for dep in g.input_dependencies(&[output.node_id()])? {
                if !seen.contains(&dep) {
                    return Err(GraphError::Disconnected(g.get_node_name(dep)?.to_string()));
                }
            }
        }
        Ok(Self {
            name: name.to_string(),
            graph,
            inputs,
            output,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn inputs(&self) -> &[Var] {
        &self.inputs
    }

    pub const fn output(&self) -> &Var {
        &self.output
    }

    /// 输入节点名（按输入顺序）
    pub fn input_names(&self) -> Result<Vec<String>, GraphError> {
        self.inputs.iter().map(Var::name).collect()
    }

    /// 输出依赖的可训练参数，按声明顺序
    pub fn trainable_weights(&self) -> Result<Vec<Var>, GraphError> {
        let ids = self
            .graph
            .inner()
            .trainable_parameters(&[self.output.node_id()])?;
        Ok(ids.into_iter().map(|id| self.graph.wrap_node_id(id)).collect())
    }

    /// 可训练参数的名称与形状，顺序同 `trainable_weights`
    pub fn weight_shapes(&self) -> Result<Vec<WeightShape>, GraphError> {
        let g = self.graph.inner();
        g.trainable_parameters(&[self.output.node_id()])?
            .into_iter()
            .map(|id| {
                let node = g.get_node(id)?;
                let shape = node.shape().to_vec_fixed().ok_or_else(|| {
                    GraphError::ComputationError(format!("参数`{}`的形状含动态维度", node.name()))
                })?;
                Ok(WeightShape::new(node.name(), &shape))
            })
            .collect()
    }

    /// 模型涉及的子图描述（只保留输出的祖先节点）
    pub fn describe(&self) -> Result<GraphDescriptor, GraphError> {
        let g = self.graph.inner();
        let keep = g.ancestors(&[self.output.node_id()])?;
        let mut desc = g.describe();
        desc.name = self.name.clone();
        desc.nodes.retain(|n| keep.contains(&NodeId(n.id)));
        Ok(desc)
    }

    /// 编译模型
    pub fn compile(self, options: CompileOptions) -> Result<CompiledModel, GraphError> {
        // 本模型只有一个输出
        if options.losses.len() != 1 {
            return Err(GraphError::InvalidOperation(format!(
                "模型`{}`只有1个输出，但提供了{}个损失",
                self.name,
                options.losses.len()
            )));
        }
        if let Some(weights) = &options.loss_weights {
            if weights.len() != options.losses.len() {
                return Err(GraphError::InvalidOperation(format!(
                    "损失权重数量{}与损失数量{}不一致",
                    weights.len(),
                    options.losses.len()
                )));
            }
        }
        let weight_shapes = self.weight_shapes()?;
        Ok(CompiledModel {
            model: self,
            optimizer: options.optimizer,
            losses: options.losses,
            loss_weights: options.loss_weights,
            sample_weight_mode: options.sample_weight_mode,
            metrics: options.metrics,
            weight_shapes,
        })
    }
}

impl Module for Model {
    /// `Model::new` 已确认输出节点在图中，图中节点只增不删，
    /// 因此遍历祖先不会出错
    fn parameters(&self) -> Vec<Var> {
        self.trainable_weights().unwrap_or_default()
    }
}

/// 编译后的模型：一个优化器、一组损失映射，交给调用方训练
pub struct CompiledModel {
    model: Model,
    optimizer: OptimizerKind,
    losses: Vec<LossEntry>,
    loss_weights: Option<Vec<f32>>,
    sample_weight_mode: Option<SampleWeightMode>,
    metrics: Vec<String>,
    weight_shapes: Vec<WeightShape>,
}

impl CompiledModel {
    pub const fn model(&self) -> &Model {
        &self.model
    }

    pub const fn optimizer(&self) -> &OptimizerKind {
        &self.optimizer
    }

    pub const fn optimizer_mut(&mut self) -> &mut OptimizerKind {
        &mut self.optimizer
    }

    pub fn losses(&self) -> &[LossEntry] {
        &self.losses
    }

    pub fn loss_weights(&self) -> Option<&[f32]> {
        self.loss_weights.as_deref()
    }

    pub const fn sample_weight_mode(&self) -> Option<SampleWeightMode> {
        self.sample_weight_mode
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// 编译时记录的可训练参数形状（顺序与 `apply_gradients` 的梯度顺序一致）
    pub fn weight_shapes(&self) -> &[WeightShape] {
        &self.weight_shapes
    }

    /// 根据各输出的损失张量计算加权总损失
    pub fn total_loss(&self, outputs: &[Tensor]) -> Result<f32, GraphError> {
        if outputs.len() != self.losses.len() {
            return Err(GraphError::ShapeMismatch {
                expected: vec![self.losses.len()],
                got: vec![outputs.len()],
                message: "损失输出数量与损失映射不一致".to_string(),
            });
        }
        Ok(self
            .losses
            .iter()
            .zip(outputs)
            .enumerate()
            .map(|(i, (entry, out))| {
                let w = self.loss_weights.as_ref().map_or(1.0, |ws| ws[i]);
                w * entry.reduction.reduce(out)
            })
            .sum())
    }

    /// 用调用方算好的梯度更新可训练参数
    ///
    /// `grads` 的顺序与 `weight_shapes()` 一致；`loss` 为本批次损失值。
    pub fn apply_gradients(&mut self, grads: &[Tensor], loss: f32) -> Result<(), GraphError> {
        let weights = self.model.trainable_weights()?;
        let mut params = weights
            .iter()
            .map(|w| {
                w.value()?.ok_or_else(|| {
                    GraphError::ComputationError(format!("参数节点{}没有值", w.node_id()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.optimizer.step(&mut params, grads, loss)?;

        let mut g = self.model.graph.inner_mut();
        for (w, value) in weights.iter().zip(&params) {
            g.set_node_value(w.node_id(), value)?;
        }
        Ok(())
    }

    /// Markdown 格式的模型摘要（仅包含本模型涉及的节点）
    pub fn summary(&self) -> Result<String, GraphError> {
        let desc = self.model.describe()?;
        let mut out = format!("# 训练模型: {}\n\n", desc.name);
        out.push_str("| 节点名称 | 输出形状 | 参数量 |\n|----------|----------|--------|\n");
        for node in &desc.nodes {
            let params = node
                .param_count
                .map_or_else(|| "-".to_string(), |n| n.to_string());
            out.push_str(&format!("| {} | {} | {} |\n", node.name, node.output_shape, params));
        }
        out.push_str(&format!(
            "\n**优化器**: {}  \n**损失**: {}  \n**可训练参数**: {}\n",
            self.optimizer.name(),
            self.losses
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            desc.trainable_params()
        ));
        Ok(out)
    }
}
