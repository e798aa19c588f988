//! Ark batch protocol adapter
//!
//! Images (seedream) are synchronous through `/images/generations`. Video
//! and 3D (seedance) go through `/contents/generations/tasks`, which
//! returns a task id; the poller drives the task to a terminal state.
//!
//! Image-to-video mode is selected by image count via the `role` tag on the
//! `image_url` entries: none for text-to-video, one tagged `first_frame`,
//! two tagged `first_frame` + `last_frame`, three or four all tagged
//! `reference_image`. More than four source images is rejected.

use serde_json::{json, Value};

use crate::client::{bearer, Header, Http};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::request::{Generated, GenerationRequest};

/// Maximum reference images the batch protocol accepts
pub const MAX_REFERENCE_IMAGES: usize = 4;

fn headers(config: &ProviderConfig) -> Vec<Header> {
    match config.api_key.as_deref() {
        Some(key) => vec![bearer(key)],
        None => Vec::new(),
    }
}

/// Build the synchronous image generation body
pub fn image_body(config: &ProviderConfig, request: &GenerationRequest) -> Value {
    let mut body = json!({
        "model": config.model_or(&request.model),
        "prompt": request.prompt,
        "response_format": "url",
    });
    if let Some(size) = &request.params.size {
        body["size"] = json!(size);
    }
    body
}

/// Parse `data[].url` into image refs
pub fn parse_images(response: &Value) -> Result<Generated> {
    let data = response
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| ProviderError::MalformedResponse("no data array".to_string()))?;

    let images: Vec<String> = data
        .iter()
        .filter_map(|item| item.get("url").and_then(|u| u.as_str()))
        .map(String::from)
        .collect();

    if images.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "no image url in data".to_string(),
        ));
    }
    Ok(Generated::Images(images))
}

/// Build the `content[]` array for a video task
///
/// The prompt travels as a single text entry with the tuning flags the
/// protocol reads out of the command text; images follow with their mode-
/// selecting `role` tags.
pub fn video_content(request: &GenerationRequest) -> Result<Vec<Value>> {
    if request.images.len() > MAX_REFERENCE_IMAGES {
        return Err(ProviderError::InvalidRequest(format!(
            "at most {} source images are supported, got {}",
            MAX_REFERENCE_IMAGES,
            request.images.len()
        )));
    }

    let mut text = request.prompt.clone();
    if let Some(ratio) = &request.params.aspect_ratio {
        text.push_str(&format!(" --ratio {}", ratio));
    }
    if let Some(resolution) = &request.params.resolution {
        text.push_str(&format!(" --resolution {}", resolution));
    }
    if let Some(duration) = request.params.duration {
        text.push_str(&format!(" --duration {}", duration));
    }

    let mut content = vec![json!({ "type": "text", "text": text })];
    let roles: &[&str] = match request.images.len() {
        0 => &[],
        1 => &["first_frame"],
        2 => &["first_frame", "last_frame"],
        _ => &["reference_image"; MAX_REFERENCE_IMAGES],
    };
    for (image, role) in request.images.iter().zip(roles) {
        content.push(json!({
            "type": "image_url",
            "image_url": { "url": image },
            "role": role,
        }));
    }
    Ok(content)
}

/// Build the `content[]` array for a 3D task
///
/// 3D generation takes one source image plus an optional prompt.
pub fn model3d_content(request: &GenerationRequest) -> Result<Vec<Value>> {
    let image = request.images.first().ok_or_else(|| {
        ProviderError::InvalidRequest("3D generation requires a source image".to_string())
    })?;

    let mut content = vec![json!({ "type": "image_url", "image_url": { "url": image } })];
    if !request.prompt.trim().is_empty() {
        content.push(json!({ "type": "text", "text": request.prompt }));
    }
    Ok(content)
}

/// Parse the task id out of a submission response
pub fn parse_task_id(response: &Value) -> Result<String> {
    response
        .get("id")
        .and_then(|i| i.as_str())
        .map(String::from)
        .ok_or_else(|| ProviderError::MalformedResponse("no task id in response".to_string()))
}

/// Synchronous image generation
pub async fn image(http: &Http, config: &ProviderConfig, request: &GenerationRequest) -> Result<Generated> {
    let url = format!("{}/images/generations", config.base());
    let response = http.post_json(&url, &headers(config), &image_body(config, request)).await?;
    parse_images(&response)
}

/// Submit a generation task, returning its id
async fn submit(http: &Http, config: &ProviderConfig, model: &str, content: Vec<Value>) -> Result<String> {
    let url = format!("{}/contents/generations/tasks", config.base());
    let body = json!({ "model": model, "content": content });
    let response = http.post_json(&url, &headers(config), &body).await?;
    let id = parse_task_id(&response)?;
    log::debug!("ark task submitted: {}", id);
    Ok(id)
}

/// Submit a video generation task
pub async fn submit_video(http: &Http, config: &ProviderConfig, request: &GenerationRequest) -> Result<String> {
    let content = video_content(request)?;
    submit(http, config, config.model_or(&request.model), content).await
}

/// Submit a 3D generation task
pub async fn submit_model3d(http: &Http, config: &ProviderConfig, request: &GenerationRequest) -> Result<String> {
    let content = model3d_content(request)?;
    submit(http, config, config.model_or(&request.model), content).await
}

/// Query a task by id
pub async fn fetch_task(http: &Http, config: &ProviderConfig, task_id: &str) -> Result<Value> {
    let url = format!("{}/contents/generations/tasks/{}", config.base(), task_id);
    http.get_json(&url, &headers(config)).await
}
