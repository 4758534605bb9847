use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::core::config::Settings;

#[derive(Debug, Clone)]
pub(crate) struct OcrResult {
    pub(crate) markdown: Option<String>,
    pub(crate) model: Option<String>,
}

/// Client for the DataLab marker API, used to read PDFs and images.
#[derive(Debug, Clone)]
pub(crate) struct DatalabOcrService {
    client: Client,
    api_key: String,
    base_url: String,
    mode: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

#[derive(Debug, Clone)]
struct MarkerJobRef {
    request_id: String,
    request_check_url: String,
}

impl DatalabOcrService {
    /// `None` when no API key is configured.
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let datalab = settings.datalab();
        if datalab.api_key.is_empty() {
            return Ok(None);
        }

        let timeout = Duration::from_secs(datalab.timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(timeout)
            .build()
            .context("Failed to build DataLab HTTP client")?;

        Ok(Some(Self {
            client,
            api_key: datalab.api_key.clone(),
            base_url: datalab.base_url.trim_end_matches('/').to_string(),
            mode: datalab.mode.clone(),
            poll_interval: Duration::from_secs(datalab.poll_interval_seconds),
            max_poll_attempts: datalab.max_poll_attempts,
        }))
    }

    /// Uploads a document and waits for its markdown rendering.
    pub(crate) async fn markdown_for_bytes(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let job_ref = self.submit_marker_job(filename, bytes).await?;
        tracing::info!(request_id = %job_ref.request_id, filename, "DataLab OCR job submitted");

        let result = self.poll_marker_result(&job_ref).await?;
        tracing::info!(
            request_id = %job_ref.request_id,
            model = result.model.as_deref().unwrap_or("-"),
            "DataLab OCR job completed"
        );

        result
            .markdown
            .filter(|markdown| !markdown.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("DataLab OCR job {} returned no markdown", job_ref.request_id))
    }

    async fn submit_marker_job(&self, filename: &str, bytes: Vec<u8>) -> Result<MarkerJobRef> {
        let endpoint = format!("{}/marker", self.base_url);

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_for_filename(filename))
            .context("Invalid upload mime type")?;
        let form = Form::new()
            .part("file", part)
            .text("mode", self.mode.clone())
            .text("output_format", "markdown");

        let response = self
            .client
            .post(&endpoint)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to call DataLab marker API")?;

        let status = response.status();
        let raw_body = response.text().await.context("Failed to read DataLab marker response")?;
        let parsed = serde_json::from_str::<Value>(&raw_body).map_err(|err| {
            anyhow::anyhow!(
                "DataLab marker returned non-JSON body (status {}): {}: {}",
                status,
                err,
                raw_body
            )
        })?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "DataLab marker submit failed (status {}): {}",
                status,
                extract_error_message(&parsed)
            ));
        }

        if parsed.get("success").and_then(Value::as_bool).is_some_and(|value| !value) {
            return Err(anyhow::anyhow!(
                "DataLab marker submit returned success=false: {}",
                extract_error_message(&parsed)
            ));
        }

        extract_marker_job_ref(&self.base_url, &parsed)
            .context("DataLab marker submit response missing request reference")
    }

    async fn poll_marker_result(&self, job_ref: &MarkerJobRef) -> Result<OcrResult> {
        for attempt in 0..self.max_poll_attempts {
            let response = self
                .client
                .get(&job_ref.request_check_url)
                .header("X-Api-Key", &self.api_key)
                .send()
                .await
                .context("Failed to call DataLab marker result endpoint")?;

            let status_code = response.status();
            let raw_body = response.text().await.context("Failed to read DataLab poll response")?;
            let parsed: Value = serde_json::from_str(&raw_body).map_err(|err| {
                anyhow::anyhow!(
                    "DataLab poll returned non-JSON body (status {}): {}: {}",
                    status_code,
                    err,
                    raw_body
                )
            })?;

            if !status_code.is_success() {
                return Err(anyhow::anyhow!(
                    "DataLab poll failed (status {}): {}",
                    status_code,
                    extract_error_message(&parsed)
                ));
            }

            let status = parsed
                .get("status")
                .and_then(Value::as_str)
                .map(|value| value.to_ascii_lowercase())
                .unwrap_or_else(|| "unknown".to_string());

            if status == "complete" || status == "completed" {
                let (markdown, model) = extract_result_payload(&parsed);
                return Ok(OcrResult { markdown, model });
            }

            if status == "failed" || status == "error" {
                return Err(anyhow::anyhow!(
                    "DataLab OCR job {} failed: {}",
                    job_ref.request_id,
                    extract_error_message(&parsed)
                ));
            }

            if parsed.get("success").and_then(Value::as_bool).is_some_and(|value| !value) {
                return Err(anyhow::anyhow!(
                    "DataLab OCR job {} returned success=false: {}",
                    job_ref.request_id,
                    extract_error_message(&parsed)
                ));
            }

            if attempt + 1 >= self.max_poll_attempts {
                break;
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(anyhow::anyhow!(
            "DataLab OCR polling timed out for request {} after {} attempts",
            job_ref.request_id,
            self.max_poll_attempts
        ))
    }
}

fn extract_marker_job_ref(base_url: &str, payload: &Value) -> Option<MarkerJobRef> {
    let request_check_url = extract_request_check_url(base_url, payload);
    let request_id = extract_request_id(payload).or_else(|| {
        request_check_url
            .clone()
            .and_then(|url| url.trim_end_matches('/').rsplit('/').next().map(ToString::to_string))
    })?;

    let request_check_url =
        request_check_url.unwrap_or_else(|| format!("{}/marker/{}", base_url, request_id));

    Some(MarkerJobRef { request_id, request_check_url })
}

fn extract_request_check_url(base_url: &str, payload: &Value) -> Option<String> {
    let raw = payload.get("request_check_url").and_then(Value::as_str)?;
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    let normalized_base = format!("{}/", base_url.trim_end_matches('/'));
    reqwest::Url::parse(&normalized_base)
        .ok()
        .and_then(|base| base.join(raw).ok())
        .map(|url| url.to_string())
}

fn extract_request_id(payload: &Value) -> Option<String> {
    if let Some(id) = payload.get("request_id").and_then(Value::as_str) {
        return Some(id.to_string());
    }

    if let Some(id) = payload.get("request_check_id").and_then(Value::as_str) {
        return Some(id.to_string());
    }

    None
}

fn extract_result_payload(payload: &Value) -> (Option<String>, Option<String>) {
    let container = payload.get("result").unwrap_or(payload);

    let markdown =
        container.get("markdown").and_then(Value::as_str).map(|value| value.to_string()).or_else(
            || payload.get("markdown").and_then(Value::as_str).map(|value| value.to_string()),
        );

    let model =
        container.get("model").and_then(Value::as_str).map(|value| value.to_string()).or_else(
            || payload.get("model").and_then(Value::as_str).map(|value| value.to_string()),
        );

    (markdown, model)
}

fn extract_error_message(payload: &Value) -> String {
    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        if let Some(items) = detail.as_array() {
            let joined = items
                .iter()
                .filter_map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .or_else(|| item.get("message").and_then(Value::as_str))
                })
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return joined;
            }
        }
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .unwrap_or("unknown_error")
        .to_string()
}

fn mime_for_filename(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_ref_resolves_relative_check_url() {
        let payload = json!({"request_id": "abc", "request_check_url": "marker/abc"});
        let job = extract_marker_job_ref("https://dl.example/api/v1", &payload).expect("job ref");
        assert_eq!(job.request_id, "abc");
        assert_eq!(job.request_check_url, "https://dl.example/api/v1/marker/abc");
    }

    #[test]
    fn job_ref_falls_back_to_id_from_url() {
        let payload = json!({"request_check_url": "https://dl.example/api/v1/marker/xyz"});
        let job = extract_marker_job_ref("https://dl.example/api/v1", &payload).expect("job ref");
        assert_eq!(job.request_id, "xyz");

        assert!(extract_marker_job_ref("https://dl.example", &json!({})).is_none());
    }

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(extract_error_message(&json!({"detail": "bad key"})), "bad key");
        assert_eq!(
            extract_error_message(&json!({"detail": [{"msg": "one"}, {"message": "two"}]})),
            "one; two"
        );
        assert_eq!(extract_error_message(&json!({"error": "boom"})), "boom");
        assert_eq!(extract_error_message(&json!({})), "unknown_error");
    }

    #[test]
    fn result_payload_reads_nested_or_flat_markdown() {
        let nested = json!({"status": "complete", "result": {"markdown": "# Hi", "model": "m1"}});
        assert_eq!(extract_result_payload(&nested), (Some("# Hi".to_string()), Some("m1".to_string())));

        let flat = json!({"status": "complete", "markdown": "plain"});
        assert_eq!(extract_result_payload(&flat), (Some("plain".to_string()), None));
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_filename("scan.PDF"), "application/pdf");
        assert_eq!(mime_for_filename("photo.jpeg"), "image/jpeg");
        assert_eq!(mime_for_filename("blob"), "application/octet-stream");
    }
}
