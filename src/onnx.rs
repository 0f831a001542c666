use crate::classifier::ImageClassifier;
use crate::config::ModelConfig;
use crate::error::ClassifierError;
use crate::models::Prediction;
use crate::preprocess::{image_to_tensor, Normalization};
use image::DynamicImage;
use log::{debug, info};
use tract_onnx::prelude::*;
use tract_core::internal::DimLike;

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// ONNX image classifier executed with tract.
pub struct TractImageClassifier {
    model: RunnableModel,
    num_classes: Option<usize>,
    vocab: Vec<String>,
    normalization: Normalization,
    apply_softmax: bool,
}

impl TractImageClassifier {
    pub fn load(config: &ModelConfig) -> Result<Self, ClassifierError> {
        let path = config.path.display().to_string();

        let model = tract_onnx::onnx()
            .model_for_path(&config.path)
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ClassifierError::ModelLoad(path.clone(), format!("{e:#}")))?;

        let num_classes = model
            .model()
            .output_fact(0)
            .ok()
            .and_then(|fact| class_count(&fact.shape));

        info!(
            "Loaded model {} ({:?} classes) with vocab {:?}",
            path, num_classes, config.vocab
        );

        Ok(Self {
            model,
            num_classes,
            vocab: config.vocab.clone(),
            normalization: config.normalization(),
            apply_softmax: config.apply_softmax,
        })
    }
}

impl ImageClassifier for TractImageClassifier {
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        let input = image_to_tensor(image, &self.normalization);

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| ClassifierError::Inference(format!("{e:#}")))?;

        let output = result
            .first()
            .ok_or_else(|| ClassifierError::MalformedOutput("model returned no outputs".into()))?
            .to_array_view::<f32>()
            .map_err(|e| ClassifierError::MalformedOutput(format!("{e:#}")))?;

        let raw: Vec<f32> = output.iter().copied().collect();
        let prediction = into_prediction(raw, &self.vocab, self.apply_softmax)?;

        debug!(
            "Predicted {} (index {}) from {:?}",
            prediction.label, prediction.index, prediction.probabilities
        );

        Ok(prediction)
    }

    fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }
}

/// Size of the last output dimension, when it is concrete.
fn class_count(shape: &[TDim]) -> Option<usize> {
    shape.last()?.to_usize().ok()
}

/// Turn the flattened model output into a labelled prediction.
pub fn into_prediction(
    raw: Vec<f32>,
    vocab: &[String],
    apply_softmax: bool,
) -> Result<Prediction, ClassifierError> {
    let probabilities = if apply_softmax { softmax(&raw) } else { raw };

    let index = argmax(&probabilities)
        .ok_or_else(|| ClassifierError::MalformedOutput("empty output tensor".into()))?;
    let label = vocab
        .get(index)
        .cloned()
        .unwrap_or_else(|| index.to_string());

    Ok(Prediction {
        label,
        index,
        probabilities,
    })
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (index, &value)| match best {
            Some((_, top)) if top >= value => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}
