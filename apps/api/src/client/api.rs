//! HTTP client for the analysis API, used by the `ats` CLI.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::analysis::handlers::AnalysisView;
use crate::client::recovery::{AnalysisFailure, AnalysisInvoker};
use crate::llm_client::AnalysisErrorKind;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{code} ({status}): {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
}

impl ClientError {
    /// Analysis failure class carried by the error body, if any.
    pub fn analysis_kind(&self) -> Option<AnalysisErrorKind> {
        match self {
            ClientError::Api { code, .. } => AnalysisErrorKind::from_code(code),
            ClientError::Http(_) => None,
        }
    }

    /// Failure class the recovery flow acts on. Error bodies without an analysis
    /// code fall back to the status: 401 is a credential problem, any other 4xx
    /// is a problem with the request itself, 5xx and transport errors mean the
    /// service is down.
    pub fn failure_kind(&self) -> AnalysisErrorKind {
        if let Some(kind) = self.analysis_kind() {
            return kind;
        }
        match self {
            ClientError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                AnalysisErrorKind::Auth
            }
            ClientError::Api { status, .. } if status.is_client_error() => AnalysisErrorKind::Input,
            _ => AnalysisErrorKind::ServiceUnavailable,
        }
    }

    fn into_failure(self) -> AnalysisFailure {
        let kind = self.failure_kind();
        let message = match &self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Http(e) => e.to_string(),
        };
        AnalysisFailure { kind, message }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeBody<'a> {
    user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    user_id: Uuid,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
        }
    }

    fn analyses_url(&self, resume_id: Uuid) -> String {
        format!("{}/api/v1/resumes/{}/analyses", self.base_url, resume_id)
    }

    pub async fn analyze(
        &self,
        resume_id: Uuid,
        job_description: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<AnalysisView, ClientError> {
        let body = AnalyzeBody {
            user_id: self.user_id,
            job_description,
            api_key,
        };
        let response = self
            .client
            .post(self.analyses_url(resume_id))
            .json(&body)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn list(&self, resume_id: Uuid) -> Result<Vec<AnalysisView>, ClientError> {
        let response = self
            .client
            .get(self.analyses_url(resume_id))
            .query(&[("user_id", self.user_id)])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn delete(&self, resume_id: Uuid, analysis_id: Uuid) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.analyses_url(resume_id), analysis_id))
            .query(&[("user_id", self.user_id)])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into `ClientError::Api`, reading the `{"error": ..}` body.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    debug!("API returned {status}: {text}");
    Err(parse_error(status, &text))
}

fn parse_error(status: StatusCode, text: &str) -> ClientError {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => ClientError::Api {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => ClientError::Api {
            status,
            code: "UNKNOWN".to_string(),
            message: text.to_string(),
        },
    }
}

/// One analysis request for a resume; the credential varies per attempt.
pub struct AnalyzeCall<'a> {
    pub client: &'a ApiClient,
    pub resume_id: Uuid,
    pub job_description: Option<&'a str>,
}

#[async_trait]
impl AnalysisInvoker for AnalyzeCall<'_> {
    type Output = AnalysisView;

    async fn invoke(&self, credential: Option<&str>) -> Result<AnalysisView, AnalysisFailure> {
        self.client
            .analyze(self.resume_id, self.job_description, credential)
            .await
            .map_err(ClientError::into_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_maps_to_kind() {
        let err = parse_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"code":"INVALID_API_KEY","message":"bad key"}}"#,
        );
        assert_eq!(err.analysis_kind(), Some(AnalysisErrorKind::Auth));
        assert_eq!(err.into_failure().message, "bad key");
    }

    #[test]
    fn test_non_analysis_error_has_no_kind() {
        let err = parse_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":"NOT_FOUND","message":"Resume not found"}}"#,
        );
        assert_eq!(err.analysis_kind(), None);
    }

    #[test]
    fn test_unknown_resume_is_an_input_failure() {
        let err = parse_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":"NOT_FOUND","message":"Resume not found"}}"#,
        );
        let failure = err.into_failure();
        assert_eq!(failure.kind, AnalysisErrorKind::Input);
        assert_eq!(failure.message, "Resume not found");
    }

    #[test]
    fn test_failure_kind_by_status_without_analysis_code() {
        let cases = [
            (StatusCode::UNPROCESSABLE_ENTITY, "plain rejection", AnalysisErrorKind::Input),
            (StatusCode::BAD_REQUEST, "bad json", AnalysisErrorKind::Input),
            (StatusCode::UNAUTHORIZED, "unauthorized", AnalysisErrorKind::Auth),
            (StatusCode::INTERNAL_SERVER_ERROR, "boom", AnalysisErrorKind::ServiceUnavailable),
        ];
        for (status, body, expected) in cases {
            assert_eq!(parse_error(status, body).failure_kind(), expected, "{status}");
        }

        let persistence = parse_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":{"code":"PERSISTENCE_ERROR","message":"The analysis could not be saved"}}"#,
        );
        assert_eq!(persistence.failure_kind(), AnalysisErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_not_found_response_round_trips_to_input() {
        use axum::response::IntoResponse;

        use crate::errors::AppError;

        let response = AppError::NotFound("Resume 42 not found".into()).into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        // axum 0.7 and reqwest 0.11 depend on different `http` majors.
        let status = StatusCode::from_u16(status.as_u16()).unwrap();
        let failure = parse_error(status, &text).into_failure();
        assert_eq!(failure.kind, AnalysisErrorKind::Input);
        assert_eq!(failure.message, "Resume 42 not found");
    }

    #[tokio::test]
    async fn test_unknown_resume_ends_recovery_without_modal() {
        use crate::client::recovery::{analyze_with_recovery, CredentialPrompt, RecoveryOutcome};

        struct NotFoundInvoker;

        #[async_trait]
        impl AnalysisInvoker for NotFoundInvoker {
            type Output = ();

            async fn invoke(&self, _credential: Option<&str>) -> Result<(), AnalysisFailure> {
                Err(parse_error(
                    StatusCode::NOT_FOUND,
                    r#"{"error":{"code":"NOT_FOUND","message":"Resume not found"}}"#,
                )
                .into_failure())
            }
        }

        #[derive(Default)]
        struct CountingPrompt {
            shown: usize,
        }

        impl CredentialPrompt for CountingPrompt {
            fn request_credential(&mut self, _reason: &str) -> Option<String> {
                self.shown += 1;
                None
            }

            fn acknowledge_unavailable(&mut self, _reason: &str) {
                self.shown += 1;
            }
        }

        let mut prompt = CountingPrompt::default();
        let (outcome, _) = analyze_with_recovery(&NotFoundInvoker, &mut prompt, None).await;
        match outcome {
            RecoveryOutcome::Failed(failure) => assert_eq!(failure.kind, AnalysisErrorKind::Input),
            other => panic!("expected input failure, got {other:?}"),
        }
        assert_eq!(prompt.shown, 0);
    }

    #[test]
    fn test_unparseable_body_treated_as_unavailable() {
        let err = parse_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        let failure = err.into_failure();
        assert_eq!(failure.kind, AnalysisErrorKind::ServiceUnavailable);
        assert!(failure.message.contains("bad gateway"));
    }

    #[test]
    fn test_analyze_body_omits_absent_fields() {
        let body = AnalyzeBody {
            user_id: Uuid::nil(),
            job_description: None,
            api_key: None,
        };
        let value = serde_json::to_value(body).unwrap();
        assert!(value.get("job_description").is_none());
        assert!(value.get("api_key").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/", Uuid::nil());
        assert_eq!(
            client.analyses_url(Uuid::nil()),
            format!("http://localhost:8080/api/v1/resumes/{}/analyses", Uuid::nil())
        );
    }
}
