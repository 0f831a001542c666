use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use tract_core::prelude::Tensor;

/// Spatial shape an image is brought to before prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    pub height: u32,
    pub width: u32,
}

impl Default for ImageShape {
    fn default() -> Self {
        Self {
            height: 192,
            width: 192,
        }
    }
}

/// Per-channel mean and standard deviation applied to `[0, 1]` pixel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

/// Scale to cover `shape`, then crop the centre.
pub fn resize_to_input(image: &DynamicImage, shape: ImageShape) -> DynamicImage {
    if image.width() == shape.width && image.height() == shape.height {
        return image.clone();
    }
    image.resize_to_fill(shape.width, shape.height, FilterType::Triangle)
}

/// NCHW `f32` tensor with a batch of one.
pub fn image_to_tensor(image: &DynamicImage, normalization: &Normalization) -> Tensor {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let array = Array4::from_shape_fn((1, 3, height as usize, width as usize), |(_, c, y, x)| {
        let pixel = rgb.get_pixel(x as u32, y as u32);
        (pixel[c] as f32 / 255.0 - normalization.mean[c]) / normalization.std[c]
    });

    Tensor::from(array)
}
