/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : OnlineParams 配置解析测试
 */

use crate::errors::OnlineError;
use crate::nn::WeightShape;
use crate::online::{DEFAULT_LOSS, LossSpec, OnlineParams};

#[test]
fn test_parse_upper_case_keys() {
    let json = r#"{
        "OPTIMIZER": "adam",
        "LR": 0.0002,
        "LOSS": "log_diff",
        "CLIP_C": 1.0,
        "CLIP_V": 0.5,
        "LR_OPTIMIZER_DECAY": 0.01,
        "BETA_1": 0.8,
        "USE_CUSTOM_LOSS": true,
        "KERAS_METRICS": ["acc"],
        "WEIGHT_SHAPES": [{"name": "w", "shape": [2, 3]}],
        "VERBOSE": 1
    }"#;
    let params = OnlineParams::from_json(json).unwrap();
    assert_eq!(params.optimizer, "adam");
    assert_eq!(params.lr, Some(0.0002));
    assert_eq!(params.loss, Some(LossSpec::from("log_diff")));
    assert_eq!(params.clip_c, Some(1.0));
    assert_eq!(params.clip_v, Some(0.5));
    assert_eq!(params.lr_optimizer_decay, Some(0.01));
    assert_eq!(params.beta_1, Some(0.8));
    assert_eq!(params.beta_2, None);
    assert!(params.use_custom_loss);
    assert_eq!(params.keras_metrics, vec!["acc".to_string()]);
    assert_eq!(params.weight_shapes, Some(vec![WeightShape::new("w", &[2, 3])]));
    assert_eq!(params.verbose, 1);
}

#[test]
fn test_parse_loss_list() {
    let json = r#"{"OPTIMIZER": "sgd", "LOSS": ["log_diff", "categorical_crossentropy"], "LOSS_WEIGHTS": [0.3, 0.7]}"#;
    let params = OnlineParams::from_json(json).unwrap();
    assert_eq!(
        params.loss,
        Some(LossSpec::Multi(vec![
            "log_diff".to_string(),
            "categorical_crossentropy".to_string()
        ]))
    );
    assert_eq!(params.loss_weights, Some(vec![0.3, 0.7]));
    assert_eq!(
        params.loss_or_default().to_string(),
        "[log_diff, categorical_crossentropy]"
    );
}

#[test]
fn test_defaults() {
    let params = OnlineParams::from_json(r#"{"OPTIMIZER": "sgd"}"#).unwrap();
    assert_eq!(params, OnlineParams::new("sgd"));
    assert!(!params.use_custom_loss);
    assert_eq!(params.verbose, 0);
    assert_eq!(params.loss_or_default(), LossSpec::Single(DEFAULT_LOSS.to_string()));
}

#[test]
fn test_missing_optimizer() {
    let err = OnlineParams::from_json(r#"{"LR": 0.1}"#).unwrap_err();
    assert!(matches!(err, OnlineError::Config(_)));
}

#[test]
fn test_to_json_keeps_key_names() {
    let mut params = OnlineParams::new("PAS");
    params.c = Some(0.5);
    let json = params.to_json().unwrap();
    assert!(json.contains("\"OPTIMIZER\""));
    assert!(json.contains("\"C\""));
    assert!(!json.contains("\"LR\""));
    assert_eq!(OnlineParams::from_json(&json).unwrap(), params);
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join("online_nmt_params_test.json");
    std::fs::write(&path, r#"{"OPTIMIZER": "adadelta", "RHO": 0.95}"#).unwrap();
    let params = OnlineParams::from_file(&path).unwrap();
    assert_eq!(params.optimizer, "adadelta");
    assert_eq!(params.rho, Some(0.95));
    std::fs::remove_file(&path).unwrap();

    let missing = std::env::temp_dir().join("online_nmt_params_missing.json");
    assert!(matches!(
        OnlineParams::from_file(missing),
        Err(OnlineError::Io(_))
    ));
}
