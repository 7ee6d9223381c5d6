/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : GraphInner describe/summary 相关方法
 */

use super::GraphInner;
use crate::nn::descriptor::{GraphDescriptor, NodeDescriptor, NodeTypeDescriptor};
use crate::nn::nodes::NodeType;
use std::fmt::Write;

impl GraphInner {
    /// 导出图的描述符（节点按 id 升序）
    pub fn describe(&self) -> GraphDescriptor {
        let mut descriptor = GraphDescriptor::new(&self.name);
        for node in &self.nodes {
            let node_type = match node.node_type() {
                NodeType::Input => NodeTypeDescriptor::Input,
                NodeType::Parameter { trainable, .. } => NodeTypeDescriptor::Parameter {
                    trainable: *trainable,
                },
                NodeType::Operation { op } => NodeTypeDescriptor::Operation { op: op.clone() },
                NodeType::Loss { loss } => NodeTypeDescriptor::Loss { loss: loss.clone() },
            };
            descriptor.add_node(NodeDescriptor::new(
                node.id().0,
                node.name(),
                node_type,
                node.shape().clone(),
                node.parents().iter().map(|id| id.0).collect(),
            ));
        }
        descriptor
    }

    /// 返回图摘要的 Markdown 格式字符串（类似 Keras 的 `model.summary()`）
    pub fn summary_markdown(&self) -> String {
        let desc = self.describe();
        let mut output = String::new();

        let _ = writeln!(output, "# 模型摘要: {}\n", desc.name);
        output.push_str("| 节点名称 | 类型 | 输出形状 | 参数量 | 父节点 |\n");
        output.push_str("|----------|------|----------|--------|--------|\n");

        for node in &desc.nodes {
            let type_name = match &node.node_type {
                NodeTypeDescriptor::Input => "Input".to_string(),
                NodeTypeDescriptor::Parameter { trainable: true } => "Parameter".to_string(),
                NodeTypeDescriptor::Parameter { trainable: false } => "Parameter(冻结)".to_string(),
                NodeTypeDescriptor::Operation { op } => op.clone(),
                NodeTypeDescriptor::Loss { loss } => format!("Loss({loss})"),
            };
            let param_str = node
                .param_count
                .map_or_else(|| "-".to_string(), |n| n.to_string());
            let parent_str = if node.parents.is_empty() {
                "-".to_string()
            } else {
                node.parents
                    .iter()
                    .filter_map(|&pid| desc.nodes.iter().find(|n| n.id == pid))
                    .map(|n| n.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                node.name, type_name, node.output_shape, param_str, parent_str
            );
        }

        let _ = write!(
            output,
            "\n**总参数量**: {}  \n**可训练参数**: {}\n",
            desc.total_params(),
            desc.trainable_params()
        );
        output
    }
}
