// Shared handling for non-2xx responses from the hosted auth and REST APIs.

use serde_json::Value;
use url::Url;

/// Keys the upstream services use for human-readable error text, in priority order
const DETAIL_KEYS: [&str; 4] = ["msg", "message", "error_description", "error"];

/// Normalise a project URL so relative joins append instead of replacing the last segment
pub(crate) fn base_url(url: &Url) -> Url {
    let mut base = url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    base
}

/// Drain a failed response into `(status, detail)`
pub(crate) async fn error_detail(response: reqwest::Response) -> (u16, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = detail_from_body(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    });
    (status.as_u16(), detail)
}

fn detail_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    DETAIL_KEYS
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
