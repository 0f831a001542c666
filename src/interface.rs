use crate::classifier::LabelPredictor;
use crate::config::{InterfaceConfig, ServerConfig};
use crate::error::ApiError;
use crate::handlers;
use crate::models::{
    Confidence, InputDescription, InterfaceDescription, LabelMap, LabelResponse, OutputDescription,
};
use crate::preprocess::{resize_to_input, ImageShape};
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Image input widget: declared shape and upload limit.
#[derive(Debug, Clone, Copy)]
pub struct ImageInput {
    pub shape: ImageShape,
    pub max_bytes: usize,
}

/// Label output widget: ranks probabilities for display.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelOutput {
    pub num_top_classes: Option<usize>,
}

impl LabelOutput {
    pub fn render(&self, map: &LabelMap) -> LabelResponse {
        let mut confidences: Vec<Confidence> = map
            .iter()
            .map(|(label, confidence)| Confidence {
                label: label.to_string(),
                confidence,
            })
            .collect();

        // Stable sort keeps category order among equal scores.
        confidences.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        if let Some(top) = self.num_top_classes {
            confidences.truncate(top);
        }

        LabelResponse {
            label: confidences.first().map(|c| c.label.clone()),
            confidences,
            probabilities: map.clone(),
        }
    }
}

pub struct Interface {
    predictor: Arc<dyn LabelPredictor>,
    input: ImageInput,
    output: LabelOutput,
    examples: Vec<PathBuf>,
    title: String,
}

impl Interface {
    pub fn new(predictor: Arc<dyn LabelPredictor>, input: ImageInput, output: LabelOutput) -> Self {
        Self {
            predictor,
            input,
            output,
            examples: Vec::new(),
            title: String::new(),
        }
    }

    pub fn from_config(
        predictor: Arc<dyn LabelPredictor>,
        interface: &InterfaceConfig,
        server: &ServerConfig,
    ) -> Self {
        let input = ImageInput {
            shape: interface.input_shape,
            max_bytes: server.max_upload_bytes,
        };
        let output = LabelOutput {
            num_top_classes: interface.num_top_classes,
        };

        Self::new(predictor, input, output)
            .with_examples(interface.examples.clone())
            .with_title(interface.title.clone())
    }

    pub fn with_examples(mut self, examples: Vec<PathBuf>) -> Self {
        self.examples = examples;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn input(&self) -> ImageInput {
        self.input
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn example(&self, index: usize) -> Option<&Path> {
        self.examples.get(index).map(PathBuf::as_path)
    }

    pub fn example_names(&self) -> Vec<String> {
        self.examples
            .iter()
            .map(|path| {
                path.file_name()
                    .unwrap_or(path.as_os_str())
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    pub fn describe(&self) -> InterfaceDescription {
        InterfaceDescription {
            title: self.title.clone(),
            input: InputDescription {
                kind: "image",
                height: self.input.shape.height,
                width: self.input.shape.width,
            },
            output: OutputDescription {
                kind: "label",
                num_top_classes: self.output.num_top_classes,
            },
            examples: self.example_names(),
        }
    }

    /// Decode, resize to the declared shape, predict once and render.
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<LabelResponse, ApiError> {
        let image = image::load_from_memory(bytes)?;
        let image = resize_to_input(&image, self.input.shape);
        let map = self.predictor.predict(&image)?;
        Ok(self.output.render(&map))
    }

    pub async fn launch(self, server: &ServerConfig) -> std::io::Result<()> {
        let interface = web::Data::new(self);

        let mut http = HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(interface.clone())
                .configure(handlers::configure)
        });
        if let Some(workers) = server.workers {
            http = http.workers(workers);
        }

        info!("Server running at http://{}:{}", server.host, server.port);

        http.bind((server.host.as_str(), server.port))?.run().await
    }
}
