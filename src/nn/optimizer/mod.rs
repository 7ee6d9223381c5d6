/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 优化器模块：Keras 风格的梯度优化算法
 */

mod adadelta;
mod adagrad;
mod adam;
mod core;
mod pas;
mod rmsprop;
mod sgd;

pub use adadelta::Adadelta;
pub use adagrad::Adagrad;
pub use adam::{Adam, Adamax, Nadam};
pub use self::core::{EPSILON, GradClip, Optimizer, OptimizerKind, global_norm};
pub use pas::{PAS, PPAS};
pub use rmsprop::RMSprop;
pub use sgd::SGD;
