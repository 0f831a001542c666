use crate::error::ConfigError;
use crate::preprocess::{ImageShape, Normalization};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub interface: InterfaceConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Class names in model output order.
    pub vocab: Vec<String>,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub apply_softmax: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    pub title: String,
    /// Display names, positionally aligned with the model output.
    pub categories: Vec<String>,
    pub input_shape: ImageShape,
    pub examples: Vec<PathBuf>,
    pub num_top_classes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let normalization = Normalization::default();
        Self {
            path: PathBuf::from("model.onnx"),
            vocab: vec!["False".to_string(), "True".to_string()],
            mean: normalization.mean,
            std: normalization.std,
            apply_softmax: true,
        }
    }
}

impl ModelConfig {
    pub fn normalization(&self) -> Normalization {
        Normalization {
            mean: self.mean,
            std: self.std,
        }
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            title: "Dog or Cat?".to_string(),
            categories: vec!["Dog".to_string(), "Cat".to_string()],
            input_shape: ImageShape::default(),
            examples: ["dog.jpg", "cat.jpg", "dunno.jpg"].iter().map(PathBuf::from).collect(),
            num_top_classes: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let toml_string = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        let config: Config = toml::from_str(&toml_string)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interface.categories.is_empty() {
            return Err(ConfigError::Invalid("interface.categories must not be empty".into()));
        }
        let shape = self.interface.input_shape;
        if shape.height == 0 || shape.width == 0 {
            return Err(ConfigError::Invalid(format!(
                "interface.input_shape must be non-zero, got {}x{}",
                shape.height, shape.width
            )));
        }
        if self.model.std.iter().any(|&s| s == 0.0) {
            return Err(ConfigError::Invalid("model.std components must be non-zero".into()));
        }
        if self.server.workers == Some(0) {
            return Err(ConfigError::Invalid("server.workers must be greater than 0".into()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_upload_bytes must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_describe_the_dog_cat_demo() {
        let config = Config::default();

        assert_eq!(config.interface.categories, vec!["Dog", "Cat"]);
        assert_eq!(config.interface.input_shape, ImageShape { height: 192, width: 192 });
        assert_eq!(config.interface.examples.len(), 3);
        assert_eq!(config.model.path, PathBuf::from("model.onnx"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 7860

            [interface]
            categories = ["Cat", "Dog"]
            input_shape = { height = 224, width = 224 }
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 7860);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.interface.categories, vec!["Cat", "Dog"]);
        assert_eq!(config.interface.input_shape.width, 224);
        assert_eq!(config.model.vocab, vec!["False", "True"]);
    }

    #[test]
    fn rejects_empty_categories() {
        let mut config = Config::default();
        config.interface.categories.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_shape_and_std() {
        let mut config = Config::default();
        config.interface.input_shape.height = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.std = [0.2, 0.0, 0.2];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_workers() {
        let config: Config = toml::from_str("[server]\nworkers = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config: Config = toml::from_str("[server]\nworkers = 4\n").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[model]\npath = \"weights/pets.onnx\"\napply_softmax = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.model.path, PathBuf::from("weights/pets.onnx"));
        assert!(!config.model.apply_softmax);
    }

    #[test]
    fn load_reports_missing_file_and_bad_toml() {
        assert!(matches!(
            Config::load(Path::new("no/such/Config.toml")),
            Err(ConfigError::Read(_, _))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }
}
