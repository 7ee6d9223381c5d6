/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 在线训练组装的端到端测试：从 JSON 配置出发，
 *                 为一个小型解码器搭建 log_diff 训练图，再用 PAS 逐句更新
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 */
use online_nmt::errors::OnlineError;
use online_nmt::nn::optimizer::Optimizer;
use online_nmt::nn::{DynamicShape, Graph, GraphError, Init, Var};
use online_nmt::online::{OnlineParams, SequenceModel, build_online_models};
use online_nmt::tensor::Tensor;

/// 最简单的解码器：source、state_below 与两个参数接到一个 "decoder" 节点
struct TinyDecoder {
    graph: Graph,
    inputs: Vec<Var>,
    outputs: Vec<Var>,
    params: Vec<Var>,
    configured: bool,
}

impl TinyDecoder {
    fn new(seed: u64) -> Result<Self, GraphError> {
        let graph = Graph::with_name_and_seed("tiny", seed);
        let inputs = vec![
            graph.input("source", DynamicShape::unknown(2))?,
            graph.input("state_below", DynamicShape::unknown(2))?,
        ];
        let params = vec![
            graph.parameter("emb", &[8, 4], Init::Normal { mean: 0.0, std: 0.1 })?,
            graph.parameter("out", &[4, 8], Init::Xavier)?,
        ];
        let mut model = Self {
            graph,
            inputs,
            outputs: Vec::new(),
            params,
            configured: false,
        };
        let preds = model.call(&model.inputs.clone())?;
        model.outputs.push(preds);
        Ok(model)
    }
}

impl SequenceModel for TinyDecoder {
    fn graph(&self) -> Graph {
        self.graph.clone()
    }

    fn inputs(&self) -> &[Var] {
        &self.inputs
    }

    fn outputs(&self) -> &[Var] {
        &self.outputs
    }

    fn call(&self, inputs: &[Var]) -> Result<Var, GraphError> {
        let parents: Vec<&Var> = inputs.iter().chain(&self.params).collect();
        self.graph
            .operation("decoder", &parents, DynamicShape::new(&[None, None, Some(8)]), None)
    }

    fn set_params(&mut self, _params: &OnlineParams) {
        self.configured = true;
    }

    fn set_optimizer(&mut self) -> Result<(), OnlineError> {
        Ok(())
    }
}

#[test]
fn test_online_pas_training() -> Result<(), OnlineError> {
    let params = OnlineParams::from_json(
        r#"{
            "OPTIMIZER": "PAS",
            "LR": 0.5,
            "C": 2.0,
            "CLIP_C": 0.0,
            "LOSS": "log_diff",
            "USE_CUSTOM_LOSS": true,
            "KERAS_METRICS": [],
            "VERBOSE": 1
        }"#,
    )?;

    let models = build_online_models(vec![TinyDecoder::new(42)?, TinyDecoder::new(43)?], &params)?;
    let mut trainers = models.into_custom().expect("应走自定义损失路径");
    assert_eq!(trainers.len(), 2);

    for trainer in &mut trainers {
        assert!(trainer.base().configured);
        let shapes = trainer.trainer().weight_shapes().to_vec();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].name, "emb");
        assert_eq!(shapes[1].shape, vec![4, 8]);

        let before: Vec<Tensor> = trainer
            .base()
            .params
            .iter()
            .map(|p| p.value().unwrap().unwrap())
            .collect();

        // 模拟逐句后编辑：损失为正时更新，损失为0时保持不变
        let grads: Vec<Tensor> = shapes.iter().map(|ws| Tensor::full(0.1, &ws.shape)).collect();
        let batch_loss = trainer
            .trainer()
            .total_loss(&[Tensor::new(&[0.2, 0.4], &[2, 1])])?;
        trainer.trainer_mut().apply_gradients(&grads, batch_loss)?;
        trainer.trainer_mut().apply_gradients(&grads, 0.0)?;
        assert_eq!(trainer.trainer().optimizer().iterations(), 2);

        // ‖g‖² = 0.01 * 64，τ = min(2, 0.3 / 0.64)
        let tau = 2.0_f32.min(0.3 / 0.64);
        for (param, old) in trainer.base().params.iter().zip(&before) {
            let new = param.value()?.unwrap();
            for (n, o) in new.data().iter().zip(old.data().iter()) {
                assert!((o - 0.5 * tau * 0.1 - n).abs() < 1e-5);
            }
        }

        let summary = trainer.trainer().summary()?;
        assert!(summary.contains("PAS"));
        assert!(summary.contains("log_diff"));
    }
    Ok(())
}

#[test]
fn test_standard_models_are_returned_untouched() -> Result<(), OnlineError> {
    let params = OnlineParams::from_json(r#"{"OPTIMIZER": "adam", "LR": 0.0002}"#)?;
    let base = TinyDecoder::new(1)?;
    let nodes = base.graph.nodes_count();

    let models = build_online_models(vec![base], &params)?
        .into_standard()
        .expect("应走标准路径");
    assert!(models[0].configured);
    assert_eq!(models[0].graph.nodes_count(), nodes);
    Ok(())
}
