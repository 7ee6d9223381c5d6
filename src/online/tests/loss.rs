/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 自定义损失注册表、图布局与损失权重解析测试
 */

use crate::errors::OnlineError;
use crate::nn::{DynamicShape, LossEntry};
use crate::online::{AuxInput, LossArg, LossKind, LossOutput, LossSpec, resolve_losses};
use super::{assert_logged, capture_logs, take_logs};
use approx::assert_abs_diff_eq;
use log::Level;

#[test]
fn test_from_name() {
    for kind in LossKind::ALL {
        assert_eq!(LossKind::from_name(kind.name()).unwrap(), kind);
        assert_eq!(kind.to_string(), kind.name());
    }
    for name in ["categorical_crossentropy", "LOG_DIFF", ""] {
        assert!(matches!(
            LossKind::from_name(name),
            Err(OnlineError::UnsupportedLoss(n)) if n == name
        ));
    }
}

#[test]
fn test_layout_table() {
    let table = [
        (LossKind::LogDiff, vec!["state_below_h", "yref", "hyp"], 1, LossOutput::PerSample),
        (
            LossKind::WeightedLogDiff,
            vec!["state_below_h", "weight", "yref", "hyp"],
            1,
            LossOutput::PerSample,
        ),
        (
            LossKind::LogDiffPlusCategoricalCrossentropy,
            vec!["state_below_h1", "state_below_h2", "weight", "yref", "hyp1", "hyp2"],
            2,
            LossOutput::PerSample,
        ),
        (
            LossKind::LinearInterpolationCategoricalCrossentropy,
            vec!["yref", "metric_value", "weight"],
            0,
            LossOutput::Flat,
        ),
        (
            LossKind::HybridLogDiff,
            vec!["state_below_h1", "yref", "hyp1", "weight1", "weight2", "p_ty"],
            1,
            LossOutput::Flat,
        ),
    ];
    for (kind, inputs, passes, output) in table {
        let layout = kind.layout();
        let names: Vec<_> = layout.inputs.iter().map(AuxInput::name).collect();
        assert_eq!(names, inputs, "{kind}");
        assert_eq!(layout.secondary_passes(), passes, "{kind}");
        assert_eq!(layout.output, output, "{kind}");
        // 前两个参数总是 yref 与基础模型的预测
        assert_eq!(&layout.args[..2], &[LossArg::Aux("yref"), LossArg::Prediction]);
    }
}

#[test]
fn test_layout_args_reference_declared_inputs() {
    for kind in LossKind::ALL {
        let layout = kind.layout();
        for arg in &layout.args {
            match arg {
                LossArg::Aux(name) => {
                    assert!(layout.inputs.iter().any(|i| i.name() == *name), "{kind}: {name}");
                }
                LossArg::Rescored(name) => {
                    assert!(layout.inputs.contains(&AuxInput::StateBelow(*name)), "{kind}: {name}");
                }
                LossArg::Prediction => {}
            }
        }
        // 所有辅助输入都会作为损失参数使用
        assert_eq!(layout.args.len(), layout.inputs.len() + 1, "{kind}");
    }
}

#[test]
fn test_aux_input_shapes() {
    assert_eq!(AuxInput::Sequence("yref").shape().to_string(), "[?, ?, ?]");
    assert_eq!(AuxInput::StateBelow("state_below_h").shape().to_string(), "[?, ?]");
    assert_eq!(AuxInput::Scalar("weight").shape().to_string(), "[?, 1]");
    assert_eq!(AuxInput::MetricValue("metric_value").shape(), DynamicShape::with_dynamic_batch(&[1]));
    assert_eq!(LossOutput::PerSample.shape().to_string(), "[?, 1]");
    assert_eq!(LossOutput::Flat.shape().to_string(), "[?]");
}

#[test]
fn test_resolve_single_loss() {
    let resolved = resolve_losses(&LossSpec::from("log_diff"), Some(&[0.3, 0.7])).unwrap();
    assert_eq!(resolved.entries, vec![LossEntry::identity("log_diff")]);
    assert_eq!(resolved.weights, None);
}

#[test]
fn test_resolve_loss_list_with_weights() {
    let spec = LossSpec::Multi(vec!["a".to_string(), "b".to_string()]);
    let resolved = resolve_losses(&spec, Some(&[0.3, 0.7])).unwrap();
    assert_eq!(
        resolved.entries,
        vec![LossEntry::identity("a"), LossEntry::identity("b")]
    );
    assert_eq!(resolved.weights, Some(vec![0.3, 0.7]));
}

#[test]
fn test_resolve_loss_list_uniform_weights() {
    let spec = LossSpec::Multi(vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()]);
    capture_logs();
    let weights = resolve_losses(&spec, None).unwrap().weights.unwrap();
    assert_eq!(weights.len(), 4);
    for w in weights {
        assert_abs_diff_eq!(w, 0.25);
    }
    assert_logged(&take_logs(), Level::Warn, "未设置 LOSS_WEIGHTS，4个损失使用相同的权重");

    // 给了权重就不告警
    capture_logs();
    resolve_losses(&spec, Some(&[0.1, 0.2, 0.3, 0.4])).unwrap();
    assert!(take_logs().iter().all(|(level, _)| *level != Level::Warn));
}

#[test]
fn test_resolve_loss_list_weight_mismatch() {
    let spec = LossSpec::Multi(vec!["a".to_string(), "b".to_string()]);
    match resolve_losses(&spec, Some(&[1.0, 2.0, 3.0])) {
        Err(OnlineError::LossWeightMismatch { losses, weights }) => {
            assert_eq!((losses, weights), (2, 3));
        }
        other => panic!("权重个数不一致时应报错，实际为{other:?}"),
    }
}
