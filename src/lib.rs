//! # Online NMT
//!
//! 神经机器翻译模型的在线训练组装：根据配置选择优化器（含 PAS 系列被动攻击式优化器），
//! 或者在基础模型的符号计算图上追加辅助输入与自定义损失，搭建并编译训练模型。
//!
//! 图层（`nn`）只做符号搭建与参数管理，梯度由调用方提供，
//! 优化器负责按各自的更新规则改写参数。
//!

pub mod errors;
pub mod nn;
pub mod online;
pub mod tensor;
