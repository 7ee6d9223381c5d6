/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 按配置选择并创建优化器
 *
 * 名称不区分大小写。内置算法各有缺省超参数；名称中含 "pas" 的
 * 在 `PAS_REGISTRY` 里查找，不在表中的一律视为不支持。
 */

use super::params::{DEFAULT_LOSS, OnlineParams};
use crate::errors::OnlineError;
use crate::nn::WeightShape;
use crate::nn::optimizer::{
    Adadelta, Adagrad, Adam, Adamax, GradClip, Nadam, OptimizerKind, PAS, PPAS, RMSprop, SGD,
};

/// PAS 系列优化器的构造函数：(权重形状, lr, C, 裁剪) -> 优化器
pub type PasFactory = fn(Vec<WeightShape>, f32, f32, GradClip) -> OptimizerKind;

fn make_pas(shapes: Vec<WeightShape>, lr: f32, c: f32, clip: GradClip) -> OptimizerKind {
    PAS::new(shapes, lr, c, clip).into()
}

fn make_ppas(shapes: Vec<WeightShape>, lr: f32, c: f32, clip: GradClip) -> OptimizerKind {
    PPAS::new(shapes, lr, c, clip).into()
}

/// PAS 系列的封闭注册表（名称不区分大小写）
pub const PAS_REGISTRY: &[(&str, PasFactory)] = &[("PAS", make_pas), ("PPAS", make_ppas)];

const BUILTIN_OPTIMIZERS: &[&str] = &[
    "sgd", "rsmprop", "rmsprop", "adagrad", "adadelta", "adam", "adamax", "nadam",
];

/// 只校验配置而不创建优化器：名称可识别，PAS 系列给出了 LR 与 C
///
/// 权重形状要等训练图搭好后才有，这里不检查。
pub fn check_optimizer(params: &OnlineParams) -> Result<(), OnlineError> {
    let name = params.optimizer.to_lowercase();
    if BUILTIN_OPTIMIZERS.contains(&name.as_str()) {
        Ok(())
    } else if name.contains("pas") {
        resolve_pas(params).map(|_| ())
    } else {
        Err(unsupported(params))
    }
}

/// 按配置创建优化器；PAS 系列使用配置中的 `WEIGHT_SHAPES`
pub fn select_optimizer(params: &OnlineParams) -> Result<OptimizerKind, OnlineError> {
    select_optimizer_with_shapes(params, params.weight_shapes.as_deref())
}

/// 按配置创建优化器，PAS 系列使用显式给出的权重形状（构建训练图时由构建器传入）
pub fn select_optimizer_with_shapes(
    params: &OnlineParams,
    weight_shapes: Option<&[WeightShape]>,
) -> Result<OptimizerKind, OnlineError> {
    if params.verbose > 0 {
        log::info!(
            "准备优化器：{} [LR: {} - LOSS: {} - CLIP_C {} - CLIP_V {} - LR_OPTIMIZER_DECAY {}]，并编译",
            params.optimizer,
            params.lr.unwrap_or(0.01),
            params
                .loss
                .as_ref()
                .map_or_else(|| DEFAULT_LOSS.to_string(), ToString::to_string),
            params.clip_c.unwrap_or(0.0),
            params.clip_v.unwrap_or(0.0),
            params.lr_optimizer_decay.unwrap_or(0.0),
        );
    }

    let clip = GradClip::new(params.clip_c.unwrap_or(10.0), params.clip_v.unwrap_or(0.0));
    let decay = params.lr_optimizer_decay.unwrap_or(0.0);
    let beta1 = params.beta_1.unwrap_or(0.9);
    let beta2 = params.beta_2.unwrap_or(0.999);
    let rho = params.rho.unwrap_or(0.9);

    let optimizer = match params.optimizer.to_lowercase().as_str() {
        "sgd" => SGD::new_with_config(
            params.lr.unwrap_or(0.01),
            params.momentum.unwrap_or(0.0),
            decay,
            params.nesterov_momentum.unwrap_or(false),
            clip,
        )
        .into(),
        "rsmprop" | "rmsprop" => {
            RMSprop::new_with_config(params.lr.unwrap_or(0.001), rho, decay, clip).into()
        }
        "adagrad" => Adagrad::new_with_config(params.lr.unwrap_or(0.01), decay, clip).into(),
        "adadelta" => Adadelta::new_with_config(params.lr.unwrap_or(1.0), rho, decay, clip).into(),
        "adam" => Adam::new_with_config(params.lr.unwrap_or(0.001), beta1, beta2, decay, clip).into(),
        "adamax" => {
            Adamax::new_with_config(params.lr.unwrap_or(0.002), beta1, beta2, decay, clip).into()
        }
        "nadam" => {
            Nadam::new_with_config(params.lr.unwrap_or(0.002), beta1, beta2, decay, clip).into()
        }
        name if name.contains("pas") => select_pas(params, weight_shapes, clip)?,
        _ => return Err(unsupported(params)),
    };
    Ok(optimizer)
}

fn unsupported(params: &OnlineParams) -> OnlineError {
    log::error!("\t不支持的优化器：{}", params.optimizer);
    OnlineError::UnsupportedOptimizer(params.optimizer.clone())
}

fn missing(params: &OnlineParams, key: &str) -> OnlineError {
    OnlineError::MissingHyperparameter {
        optimizer: params.optimizer.clone(),
        key: key.to_string(),
    }
}

/// 在注册表中查找 PAS 系列，并取出必需的 (构造函数, lr, C)
fn resolve_pas(params: &OnlineParams) -> Result<(PasFactory, f32, f32), OnlineError> {
    let &(_, factory) = PAS_REGISTRY
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&params.optimizer))
        .ok_or_else(|| unsupported(params))?;
    let lr = params.lr.ok_or_else(|| missing(params, "LR"))?;
    let c = params.c.ok_or_else(|| missing(params, "C"))?;
    Ok((factory, lr, c))
}

fn select_pas(
    params: &OnlineParams,
    weight_shapes: Option<&[WeightShape]>,
    clip: GradClip,
) -> Result<OptimizerKind, OnlineError> {
    let (factory, lr, c) = resolve_pas(params)?;
    let shapes = weight_shapes.ok_or_else(|| missing(params, "WEIGHT_SHAPES"))?;
    Ok(factory(shapes.to_vec(), lr, c, clip))
}
