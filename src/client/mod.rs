use crate::intake::QueuedDocument;
use crate::Issue;
use reqwest::blocking::multipart;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

const ANALYZE_FALLBACK: &str = "Analysis request failed.";
const CONTENT_FALLBACK: &str = "Unable to fetch file content.";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Non-success status; carries the server-provided detail or raw body.
    #[error("{detail}")]
    Status { status: StatusCode, detail: String },

    #[error("{0}")]
    UnexpectedResponse(&'static str),

    #[error("failed to read {name}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Word and issue counts the service may attach per file. Absent counters
/// fall back to counting the issue list client-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileStats {
    #[serde(default)]
    pub word_count: Option<usize>,
    #[serde(default)]
    pub spelling_issues: Option<usize>,
    #[serde(default)]
    pub grammar_issues: Option<usize>,
}

/// Per-file analysis result from the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub id: String,
    #[serde(default)]
    pub stats: Option<FileStats>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub files: Vec<FileReport>,
}

#[derive(Deserialize)]
struct ContentPayload {
    content: Option<String>,
}

/// Blocking client for the analysis service. One request per user action;
/// no retry, no timeout.
pub struct AnalyzeClient {
    base_url: String,
    include_content: bool,
    http: reqwest::blocking::Client,
}

impl AnalyzeClient {
    pub fn new(base_url: &str, include_content: bool) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            include_content,
            http: reqwest::blocking::Client::builder().build()?,
        })
    }

    /// Upload the queued documents as one multipart request and return the
    /// parsed result envelope.
    pub fn analyze(&self, documents: &[QueuedDocument]) -> Result<AnalyzeResponse, ServiceError> {
        let mut form = multipart::Form::new();
        for document in documents {
            let bytes = document.read_bytes().map_err(|source| ServiceError::Read {
                name: document.name.clone(),
                source,
            })?;
            let part = multipart::Part::bytes(bytes).file_name(document.name.clone());
            form = form.part("files", part);
        }

        let url = format!(
            "{}/analyze-files?include_content={}",
            self.base_url, self.include_content
        );
        let response = self.http.post(&url).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status,
                detail: error_detail(&body, ANALYZE_FALLBACK),
            });
        }

        parse_analyze_response(&body)
    }

    /// Fetch decoded text for a file the service kept server-side.
    pub fn fetch_content(&self, content_id: &str) -> Result<String, ServiceError> {
        let url = format!("{}/file-content/{}", self.base_url, content_id);
        let response = self.http.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status,
                detail: error_detail(&body, CONTENT_FALLBACK),
            });
        }

        parse_content_response(&body)
    }
}

fn parse_analyze_response(body: &str) -> Result<AnalyzeResponse, ServiceError> {
    serde_json::from_str(body).map_err(|_| {
        ServiceError::UnexpectedResponse("Unexpected response from analysis service.")
    })
}

fn parse_content_response(body: &str) -> Result<String, ServiceError> {
    serde_json::from_str::<ContentPayload>(body)
        .ok()
        .and_then(|payload| payload.content)
        .ok_or(ServiceError::UnexpectedResponse(
            "Unexpected response when loading file content.",
        ))
}

/// Derive a user-facing message from an error body: the `detail` field of a
/// JSON body, a bare JSON string, the raw text, or the fallback.
fn error_detail(body: &str, fallback: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(message)) => message,
        Ok(value) => value
            .get("detail")
            .and_then(|d| d.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string()),
        Err(_) => {
            if body.trim().is_empty() {
                fallback.to_string()
            } else {
                body.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IssueKind;

    #[test]
    fn test_error_detail_prefers_json_detail_field() {
        let body = r#"{"detail": "file too large"}"#;
        assert_eq!(error_detail(body, "fallback"), "file too large");
    }

    #[test]
    fn test_error_detail_falls_back_without_detail() {
        assert_eq!(error_detail(r#"{"other": 1}"#, "fallback"), "fallback");
        assert_eq!(error_detail("", "fallback"), "fallback");
    }

    #[test]
    fn test_error_detail_passes_plain_text_through() {
        assert_eq!(
            error_detail("Internal Server Error", "fallback"),
            "Internal Server Error"
        );
        assert_eq!(error_detail(r#""quota exceeded""#, "x"), "quota exceeded");
    }

    #[test]
    fn test_parse_analyze_response() {
        let body = r#"{
            "files": [{
                "id": "notes.txt",
                "stats": {"word_count": 4, "spelling_issues": 1, "grammar_issues": 0},
                "issues": [{
                    "type": "spelling",
                    "message": "Possible misspelling",
                    "original": "teh",
                    "suggestions": ["the"],
                    "position": {"start": 0, "end": 3}
                }],
                "content_id": "abc-123"
            }]
        }"#;

        let response = parse_analyze_response(body).unwrap();
        assert_eq!(response.files.len(), 1);

        let file = &response.files[0];
        assert_eq!(file.id, "notes.txt");
        assert_eq!(file.content_id.as_deref(), Some("abc-123"));
        assert_eq!(file.issues[0].kind, IssueKind::Spelling);
        assert_eq!(file.issues[0].position.start, 0);
        assert_eq!(file.stats.as_ref().unwrap().word_count, Some(4));
    }

    #[test]
    fn test_parse_analyze_response_tolerates_missing_optionals() {
        let body = r#"{"files": [{"id": "broken.docx", "error": "could not decode"}]}"#;
        let response = parse_analyze_response(body).unwrap();

        let file = &response.files[0];
        assert!(file.issues.is_empty());
        assert!(file.stats.is_none());
        assert_eq!(file.error.as_deref(), Some("could not decode"));
    }

    #[test]
    fn test_parse_analyze_response_rejects_missing_envelope() {
        assert!(parse_analyze_response(r#"{"results": []}"#).is_err());
        assert!(parse_analyze_response("not json").is_err());
    }

    #[test]
    fn test_parse_content_response() {
        assert_eq!(
            parse_content_response(r#"{"content": "hello"}"#).unwrap(),
            "hello"
        );
        assert!(parse_content_response(r#"{"content": null}"#).is_err());
        assert!(parse_content_response(r#"{}"#).is_err());
        assert!(parse_content_response("oops").is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = AnalyzeClient::new("http://localhost:8000/", false).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
