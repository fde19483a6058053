//! Browser `fetch` helpers

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

#[derive(Debug, Error)]
pub enum WebError {
    #[error("no window")]
    NoWindow,
    #[error("{0}")]
    Js(String),
    #[error("HTTP {0}")]
    Status(u16),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError::Js(js_message(&value))
    }
}

/// Best-effort readable text for a thrown JS value
pub fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

async fn send(url: &str, method: &str, body: Option<&str>) -> Result<Response, WebError> {
    let window = web_sys::window().ok_or(WebError::NoWindow)?;

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &opts)?;
    if body.is_some() {
        request.headers().set("Content-Type", "application/json")?;
    }

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(WebError::Status(response.status()));
    }
    Ok(response)
}

/// Response body as text
pub async fn request_text(url: &str, method: &str, body: Option<&str>) -> Result<String, WebError> {
    let response = send(url, method, body).await?;
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| WebError::Js("response body is not text".to_string()))
}

/// GET a binary resource
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, WebError> {
    let response = send(url, "GET", None).await?;
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// GET a binary resource as an `ArrayBuffer`, for APIs that take one directly
pub async fn fetch_array_buffer(url: &str) -> Result<js_sys::ArrayBuffer, WebError> {
    let response = send(url, "GET", None).await?;
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(buffer.dyn_into()?)
}
