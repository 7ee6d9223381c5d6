/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Module trait 定义
 */

use super::Var;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（签名各异）
/// - `parameters()` 返回 `Vec<Var>`（签名一致，放入 trait）
pub trait Module {
    /// 获取所有可训练参数（按声明顺序）
    fn parameters(&self) -> Vec<Var>;

    /// 获取参数张量个数
    fn num_params(&self) -> usize {
        self.parameters().len()
    }
}
