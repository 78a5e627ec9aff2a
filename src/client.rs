//! Browser side of the generation endpoint, plus the best-effort clipboard
//! and download helpers used by the output panel.

use futures::stream::{self, Stream};
use js_sys::{Array, Function, Promise, Reflect, Uint8Array};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, Headers, HtmlAnchorElement, ReadableStreamDefaultReader, RequestInit,
    Response, Url,
};

use crate::types::{GenerationRequest, GENERATE_PATH};

pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("response has no body")]
    MissingBody,
    #[error("failed to read response body: {0}")]
    Read(String),
    #[error("browser API unavailable: {0}")]
    Browser(String),
}

fn js_error(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn window() -> Result<web_sys::Window, ClientError> {
    web_sys::window().ok_or_else(|| ClientError::Browser("no window".to_string()))
}

/// Posts the request and returns a reader over the streamed body once the
/// server has accepted it.
pub async fn start_generation(
    request: &GenerationRequest,
) -> Result<ReadableStreamDefaultReader, ClientError> {
    let body = serde_json::to_string(request).map_err(|e| ClientError::Request(e.to_string()))?;

    let headers = Headers::new().map_err(|e| ClientError::Request(js_error(e)))?;
    headers
        .set("Content-Type", "application/json")
        .map_err(|e| ClientError::Request(js_error(e)))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));

    let response: Response = JsFuture::from(window()?.fetch_with_str_and_init(GENERATE_PATH, &init))
        .await
        .map_err(|e| ClientError::Request(js_error(e)))?
        .dyn_into()
        .map_err(|e| ClientError::Request(js_error(e)))?;

    if !response.ok() {
        return Err(ClientError::Status(response.status()));
    }

    let body = response.body().ok_or(ClientError::MissingBody)?;
    Ok(body.get_reader().unchecked_into())
}

/// Adapts a body reader into a byte-chunk stream. A failed read ends the
/// stream after yielding the error.
pub fn read_chunks(
    reader: ReadableStreamDefaultReader,
) -> impl Stream<Item = Result<Vec<u8>, ClientError>> {
    stream::unfold(Some(reader), |reader| async move {
        let reader = reader?;
        match read_next(&reader).await {
            Ok(Some(bytes)) => Some((Ok(bytes), Some(reader))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })
}

async fn read_next(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>, ClientError> {
    let read_err = |e: JsValue| ClientError::Read(js_error(e));

    let result = JsFuture::from(reader.read()).await.map_err(read_err)?;
    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(read_err)?
        .as_bool()
        .unwrap_or(true);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value")).map_err(read_err)?;
    Ok(Some(Uint8Array::new(&value).to_vec()))
}

pub async fn copy_to_clipboard(text: &str) -> Result<(), ClientError> {
    let browser_err = |e: JsValue| ClientError::Browser(js_error(e));

    let navigator = window()?.navigator();
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard")).map_err(browser_err)?;
    let write_text: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .map_err(browser_err)?
        .dyn_into()
        .map_err(browser_err)?;
    let promise: Promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(browser_err)?
        .dyn_into()
        .map_err(browser_err)?;
    JsFuture::from(promise).await.map_err(browser_err)?;
    Ok(())
}

/// Saves `text` through a temporary object URL and anchor click.
pub fn download_text(text: &str, file_name: &str) -> Result<(), ClientError> {
    let browser_err = |e: JsValue| ClientError::Browser(js_error(e));

    let options = BlobPropertyBag::new();
    options.set_type("text/plain");
    let parts = Array::of1(&JsValue::from_str(text));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(browser_err)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(browser_err)?;

    let document = window()?
        .document()
        .ok_or_else(|| ClientError::Browser("no document".to_string()))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(browser_err)?
        .dyn_into()
        .map_err(|_| ClientError::Browser("anchor element".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    Url::revoke_object_url(&url).map_err(browser_err)
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
