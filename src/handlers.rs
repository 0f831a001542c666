use crate::error::ApiError;
use crate::interface::Interface;
use crate::models::{LabelResponse, PredictionResponse};
use crate::page;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Result};
use futures_util::StreamExt;
use log::{debug, warn};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/config", web::get().to(interface_config))
        .service(web::resource("/predict").route(web::post().to(predict)))
        .route("/examples/{index}", web::get().to(example_image))
        .route("/examples/{index}/predict", web::post().to(predict_example));
}

pub async fn index(interface: web::Data<Interface>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page::render(&interface))
}

pub async fn interface_config(interface: web::Data<Interface>) -> HttpResponse {
    HttpResponse::Ok().json(interface.describe())
}

pub async fn predict(
    interface: web::Data<Interface>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let id = Uuid::new_v4();
    let bytes = read_upload(&mut payload, interface.input().max_bytes).await?;
    debug!("[{}] Received upload of {} bytes", id, bytes.len());

    let result = classify(interface, bytes, id).await?;
    Ok(HttpResponse::Ok().json(PredictionResponse {
        id: id.to_string(),
        result,
    }))
}

pub async fn example_image(
    interface: web::Data<Interface>,
    index: web::Path<usize>,
) -> Result<HttpResponse, ApiError> {
    let index = index.into_inner();
    let (bytes, content_type) = {
        let path = interface.example(index).ok_or(ApiError::ExampleNotFound(index))?;
        let content_type = content_type_for(path);
        (read_example(path.to_path_buf()).await?, content_type)
    };

    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}

pub async fn predict_example(
    interface: web::Data<Interface>,
    index: web::Path<usize>,
) -> Result<HttpResponse, ApiError> {
    let id = Uuid::new_v4();
    let index = index.into_inner();
    let path = interface
        .example(index)
        .ok_or(ApiError::ExampleNotFound(index))?
        .to_path_buf();
    debug!("[{}] Classifying example {}", id, path.display());

    let bytes = read_example(path).await?;
    let result = classify(interface, bytes, id).await?;
    Ok(HttpResponse::Ok().json(PredictionResponse {
        id: id.to_string(),
        result,
    }))
}

async fn classify(
    interface: web::Data<Interface>,
    bytes: Vec<u8>,
    id: Uuid,
) -> Result<LabelResponse, ApiError> {
    let result = web::block(move || interface.classify_bytes(&bytes)).await?;
    match &result {
        Ok(response) => debug!("[{}] Prediction: {:?}", id, response.confidences),
        Err(e) => warn!("[{}] Prediction failed: {}", id, e),
    }
    result
}

/// Collect the first non-empty multipart field.
async fn read_upload(payload: &mut Multipart, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::Upload(e.to_string()))?;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::Upload(e.to_string()))?;
            if data.len() + chunk.len() > max_bytes {
                return Err(ApiError::UploadTooLarge(max_bytes));
            }
            data.extend_from_slice(&chunk);
        }

        if !data.is_empty() {
            return Ok(data);
        }
    }

    Err(ApiError::MissingImage)
}

async fn read_example(path: std::path::PathBuf) -> Result<Vec<u8>, ApiError> {
    let display = path.display().to_string();
    web::block(move || fs::read(&path))
        .await?
        .map_err(|e| {
            warn!("Failed to read example {}: {}", display, e);
            ApiError::ExampleRead(display, e)
        })
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for(Path::new("dog.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("CAT.JPEG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("dunno.png")), "image/png");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }
}
