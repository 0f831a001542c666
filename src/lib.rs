//! Dog-or-cat image classifier served through a small web interface.
//!
//! A [`classifier::LabelAdapter`] turns the raw output of an
//! [`classifier::ImageClassifier`] into named probabilities, and an
//! [`interface::Interface`] exposes any [`classifier::LabelPredictor`] over HTTP.

pub mod classifier;
pub mod config;
pub mod error;
pub mod handlers;
pub mod interface;
pub mod models;
pub mod onnx;
pub mod page;
pub mod preprocess;
