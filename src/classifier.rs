use crate::error::ClassifierError;
use crate::models::{LabelMap, Prediction};
use image::DynamicImage;
use std::sync::Arc;

/// A trained model able to classify a single image.
pub trait ImageClassifier: Send + Sync {
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError>;

    /// Number of classes in the model output, when known up front.
    fn num_classes(&self) -> Option<usize> {
        None
    }
}

/// Anything that turns an image into named probabilities.
///
/// The serving layer only depends on this, so it can be driven by a
/// [`LabelAdapter`] in production and by a plain closure in tests.
pub trait LabelPredictor: Send + Sync {
    fn predict(&self, image: &DynamicImage) -> Result<LabelMap, ClassifierError>;
}

impl<F> LabelPredictor for F
where
    F: Fn(&DynamicImage) -> Result<LabelMap, ClassifierError> + Send + Sync,
{
    fn predict(&self, image: &DynamicImage) -> Result<LabelMap, ClassifierError> {
        self(image)
    }
}

/// Binds a model handle to the class names its probabilities line up with.
#[derive(Clone)]
pub struct LabelAdapter {
    classifier: Arc<dyn ImageClassifier>,
    categories: Arc<[String]>,
}

impl LabelAdapter {
    pub fn new<I, S>(classifier: Arc<dyn ImageClassifier>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classifier,
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Whether the model's class count, if it reports one, matches the categories.
    pub fn is_aligned(&self) -> bool {
        self.classifier
            .num_classes()
            .map_or(true, |count| count == self.categories.len())
    }
}

impl LabelPredictor for LabelAdapter {
    // Predicted label and index are ignored; only positions in the
    // probability vector matter. Pairing stops at the shorter sequence.
    fn predict(&self, image: &DynamicImage) -> Result<LabelMap, ClassifierError> {
        let Prediction { probabilities, .. } = self.classifier.predict(image)?;

        Ok(self
            .categories
            .iter()
            .zip(probabilities)
            .map(|(name, probability)| (name.clone(), f64::from(probability)))
            .collect())
    }
}
