//! Thin transport shared by the source clients.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

const MAX_ERROR_BODY: usize = 300;

pub(crate) fn build_client(source: &str) -> Result<Client> {
    build_client_with_headers(source, HeaderMap::new())
}

pub(crate) fn build_client_with_headers(source: &str, headers: HeaderMap) -> Result<Client> {
    let user_agent = format!("animelink/{}", env!("CARGO_PKG_VERSION"));
    Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent)
        .default_headers(headers)
        .build()
        .map_err(|e| Error::UpstreamFetch(format!("failed to build {} HTTP client: {}", source, e)))
}

/// Resolves `path` against a base URL that ends with `/`.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::UpstreamFetch(format!("invalid endpoint '{}': {}", path, e)))
}

pub(crate) async fn get_text(client: &Client, url: Url) -> Result<String> {
    send(client.get(url.clone()), &url).await
}

pub(crate) async fn get_json<T: DeserializeOwned>(client: &Client, url: Url) -> Result<T> {
    let request = client
        .get(url.clone())
        .header(ACCEPT, HeaderValue::from_static("application/json"));
    let text = send(request, &url).await?;
    decode_json(&url, &text)
}

pub(crate) async fn post_json<B, T>(client: &Client, url: Url, body: &B) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let text = send(client.post(url.clone()).json(body), &url).await?;
    decode_json(&url, &text)
}

pub(crate) async fn send(request: RequestBuilder, url: &Url) -> Result<String> {
    debug!(url = %url, "Sending upstream request");
    let res = request
        .send()
        .await
        .map_err(|e| Error::UpstreamFetch(format!("{} -> {}", url, e)))?;
    let status = res.status();
    let text = res
        .text()
        .await
        .map_err(|e| Error::UpstreamFetch(format!("{} -> reading body failed: {}", url, e)))?;
    if !status.is_success() {
        return Err(Error::UpstreamFetch(format!(
            "{} -> status {}: {}",
            url,
            status,
            truncate(&text)
        )));
    }
    Ok(text)
}

pub(crate) fn decode_json<T: DeserializeOwned>(url: &Url, text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| Error::MalformedResponse(format!("{} -> JSON parse failed: {}", url, e)))
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_ERROR_BODY).collect();
    out.push('…');
    out
}
