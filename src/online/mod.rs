/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 在线训练（交互式机器翻译的后编辑学习）的组装：
 *                 优化器选择与训练图构建
 */

mod builder;
mod loss;
mod optimizer;
mod params;

pub use builder::{
    OnlineModels, OnlineTrainer, SequenceModel, build_online_models, build_trainer_model,
};
pub use loss::{
    AuxInput, LossArg, LossKind, LossLayout, LossOutput, ResolvedLoss, resolve_losses,
};
pub use optimizer::{
    PAS_REGISTRY, PasFactory, check_optimizer, select_optimizer, select_optimizer_with_shapes,
};
pub use params::{DEFAULT_LOSS, LossSpec, OnlineParams};

#[cfg(test)]
mod tests;
