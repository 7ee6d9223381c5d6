/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 在线训练模型的组装
 *
 * 不使用自定义损失时，基础模型自己配置优化器；
 * 使用自定义损失时，为每个基础模型搭一张训练图：
 * 追加辅助输入 -> 重新调用基础模型 -> 损失节点 -> 新模型 -> 编译。
 */

use super::loss::{LossArg, LossKind, ResolvedLoss, resolve_losses};
use super::optimizer::{check_optimizer, select_optimizer_with_shapes};
use super::params::{LossSpec, OnlineParams};
use crate::errors::{BuildFailure, OnlineError};
use crate::nn::{CompileOptions, CompiledModel, Graph, GraphError, Model, Var};

/// 可在线训练的序列到序列基础模型
pub trait SequenceModel {
    /// 模型所在的计算图
    fn graph(&self) -> Graph;

    /// 符号输入（第一个为源序列）
    fn inputs(&self) -> &[Var];

    /// 符号输出（第一个为目标词的概率）
    fn outputs(&self) -> &[Var];

    /// 以新的输入再次调用模型，共享同一组参数
    fn call(&self, inputs: &[Var]) -> Result<Var, GraphError>;

    /// 接收在线训练配置
    fn set_params(&mut self, params: &OnlineParams);

    /// 按已接收的配置自行编译标准优化器
    fn set_optimizer(&mut self) -> Result<(), OnlineError>;
}

/// 基础模型及其编译好的训练模型
pub struct OnlineTrainer<M> {
    base: M,
    trainer: CompiledModel,
}

impl<M> OnlineTrainer<M> {
    pub const fn new(base: M, trainer: CompiledModel) -> Self {
        Self { base, trainer }
    }

    pub const fn base(&self) -> &M {
        &self.base
    }

    pub const fn base_mut(&mut self) -> &mut M {
        &mut self.base
    }

    pub const fn trainer(&self) -> &CompiledModel {
        &self.trainer
    }

    pub const fn trainer_mut(&mut self) -> &mut CompiledModel {
        &mut self.trainer
    }

    pub fn into_parts(self) -> (M, CompiledModel) {
        (self.base, self.trainer)
    }
}

/// 组装结果：原样返回的基础模型，或基础模型与训练模型的配对
pub enum OnlineModels<M> {
    Standard(Vec<M>),
    Custom(Vec<OnlineTrainer<M>>),
}

impl<M> OnlineModels<M> {
    pub fn len(&self) -> usize {
        match self {
            Self::Standard(models) => models.len(),
            Self::Custom(trainers) => trainers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    pub fn into_standard(self) -> Option<Vec<M>> {
        match self {
            Self::Standard(models) => Some(models),
            Self::Custom(_) => None,
        }
    }

    pub fn into_custom(self) -> Option<Vec<OnlineTrainer<M>>> {
        match self {
            Self::Custom(trainers) => Some(trainers),
            Self::Standard(_) => None,
        }
    }
}

/// 为一组基础模型准备在线训练
///
/// # 流程
/// - `USE_CUSTOM_LOSS` 为假：依次调用每个模型的 `set_params` 与 `set_optimizer`
/// - 为真：先解析损失、损失权重并校验优化器配置（出错时不会改动任何图），
///   再为每个模型搭训练图并用选出的优化器编译
///
/// 失败时交入的基础模型随 [`BuildFailure`] 原样交还。
pub fn build_online_models<M: SequenceModel>(
    mut models: Vec<M>,
    params: &OnlineParams,
) -> Result<OnlineModels<M>, BuildFailure<M>> {
    if !params.use_custom_loss {
        let configured = models.iter_mut().try_for_each(|model| {
            model.set_params(params);
            model.set_optimizer()
        });
        return match configured {
            Ok(()) => Ok(OnlineModels::Standard(models)),
            Err(error) => Err(BuildFailure::new(error, models)),
        };
    }

    let (kind, resolved) = match prepare_custom_loss(params) {
        Ok(prepared) => prepared,
        Err(error) => return Err(BuildFailure::new(error, models)),
    };

    let mut trainers: Vec<OnlineTrainer<M>> = Vec::with_capacity(models.len());
    let mut pending = models.into_iter();
    while let Some(mut base) = pending.next() {
        base.set_params(params);
        match compile_trainer(&base, kind, &resolved, params) {
            Ok(compiled) => trainers.push(OnlineTrainer::new(base, compiled)),
            Err(error) => {
                let models = trainers
                    .into_iter()
                    .map(|trainer| trainer.into_parts().0)
                    .chain(std::iter::once(base))
                    .chain(pending)
                    .collect();
                return Err(BuildFailure::new(error, models));
            }
        }
    }
    Ok(OnlineModels::Custom(trainers))
}

/// 搭图前的全部配置检查：损失、损失权重、优化器
fn prepare_custom_loss(params: &OnlineParams) -> Result<(LossKind, ResolvedLoss), OnlineError> {
    let loss = params.loss_or_default();
    log::info!("使用自定义损失：{loss}");
    let resolved = resolve_losses(&loss, params.loss_weights.as_deref())?;
    let kind = match &loss {
        LossSpec::Single(name) => LossKind::from_name(name)?,
        LossSpec::Multi(_) => return Err(OnlineError::UnsupportedLoss(loss.to_string())),
    };
    check_optimizer(params)?;
    Ok((kind, resolved))
}

fn compile_trainer<M: SequenceModel>(
    base: &M,
    kind: LossKind,
    resolved: &ResolvedLoss,
    params: &OnlineParams,
) -> Result<CompiledModel, OnlineError> {
    let model = build_trainer_model(base, kind)?;

    let weight_shapes = model.weight_shapes()?;
    if weight_shapes.is_empty() {
        log::warn!("训练模型`{}`没有可训练参数", model.name());
    }
    let optimizer = select_optimizer_with_shapes(params, Some(&weight_shapes))?;
    Ok(model.compile(CompileOptions {
        optimizer,
        losses: resolved.entries.clone(),
        loss_weights: resolved.weights.clone(),
        sample_weight_mode: None,
        metrics: params.keras_metrics.clone(),
    })?)
}

/// 在基础模型的图上搭建训练图
///
/// 新模型的输入为基础模型的输入加上损失所需的辅助输入，输出为损失节点。
pub fn build_trainer_model<M: SequenceModel + ?Sized>(
    base: &M,
    kind: LossKind,
) -> Result<Model, OnlineError> {
    let graph = base.graph();
    let layout = kind.layout();

    let source = base
        .inputs()
        .first()
        .ok_or_else(|| GraphError::InvalidOperation("基础模型没有输入".to_string()))?;
    let preds_y = base
        .outputs()
        .first()
        .ok_or_else(|| GraphError::InvalidOperation("基础模型没有输出".to_string()))?;

    let mut aux = Vec::with_capacity(layout.inputs.len());
    for input in &layout.inputs {
        aux.push((input.name(), graph.input(input.name(), input.shape())?));
    }
    let lookup = |name: &str| -> Result<Var, GraphError> {
        aux.iter()
            .find(|(n, _)| *n == name)
            .map(|(_, var)| var.clone())
            .ok_or_else(|| GraphError::InvalidOperation(format!("损失{kind}缺少辅助输入`{name}`")))
    };

    let mut args = Vec::with_capacity(layout.args.len());
    for arg in &layout.args {
        let var = match *arg {
            LossArg::Aux(name) => lookup(name)?,
            LossArg::Prediction => preds_y.clone(),
            LossArg::Rescored(state_below) => base.call(&[source.clone(), lookup(state_below)?])?,
        };
        args.push(var);
    }
    let arg_refs: Vec<&Var> = args.iter().collect();
    let loss = graph.loss(kind.name(), &arg_refs, layout.output.shape())?;

    let mut inputs = base.inputs().to_vec();
    inputs.extend(aux.into_iter().map(|(_, var)| var));
    Ok(Model::new(&format!("{}_trainer", graph.name()), inputs, loss)?)
}
