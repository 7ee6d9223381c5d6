/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : GraphInner 计算图的底层实现
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 创建、访问器、遍历
 * - node_builders.rs: new_*_node
 * - describe.rs: describe/summary
 */

mod core;
mod describe;
mod node_builders;

use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// 图的完整定义（核心实现）
///
/// 节点按声明顺序存放，`nodes[i]` 的 id 即为 `NodeId(i)`，
/// 因此"按 id 排序"就是"按声明顺序排序"。
pub struct GraphInner {
    pub(in crate::nn::graph) name: String,
    pub(in crate::nn::graph) nodes: Vec<NodeHandle>,
    /// 节点名 -> 节点 ID（名称在图内唯一）
    pub(in crate::nn::graph) names: HashMap<String, NodeId>,
    /// 参数初始化用的随机数生成器（None 表示使用线程 RNG）
    pub(in crate::nn::graph) rng: Option<StdRng>,
}
