use std::env;

use async_trait::async_trait;
use nihongo_core::model::{
    AnswerPair, AttemptId, AttemptResult, AttemptReview, JlptLevel, Test, TestId, TestSummary,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::ExamApi;
use super::dto::{
    AttemptDetailDto, SubmitRequest, SubmitResponseDto, TestDetailDto, TestSummaryDto,
};
use crate::error::ApiError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";

#[derive(Clone, Debug)]
pub struct ApiConfig {
    base_url: Url,
    token: Option<String>,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        // Url::join drops the last path segment unless it ends in '/'.
        let mut raw = base_url.trim().to_owned();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Self {
            base_url: Url::parse(&raw)?,
            token: None,
        })
    }

    /// Reads `NIHONGO_API_BASE_URL` and `NIHONGO_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the configured base URL does not parse.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url =
            env::var("NIHONGO_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
        let config = Self::new(&base_url)?;
        Ok(match env::var("NIHONGO_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => config.with_token(token),
            _ => config,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    fn tests_url(&self, level: JlptLevel) -> Result<Url, ApiError> {
        let mut url = self.endpoint("jlpt-practice/tests/")?;
        url.query_pairs_mut().append_pair("level", level.as_str());
        Ok(url)
    }

    fn test_url(&self, test_id: TestId) -> Result<Url, ApiError> {
        self.endpoint(&format!("jlpt-practice/tests/{test_id}/"))
    }

    fn submit_url(&self, test_id: TestId) -> Result<Url, ApiError> {
        self.endpoint(&format!("jlpt-practice/tests/{test_id}/submit/"))
    }

    fn attempt_url(&self, attempt_id: AttemptId) -> Result<Url, ApiError> {
        self.endpoint(&format!("jlpt-practice/attempts/{attempt_id}/"))
    }
}

/// `ExamApi` over the backend's JSON HTTP interface.
#[derive(Clone)]
pub struct HttpExamApi {
    client: Client,
    config: ApiConfig,
}

impl HttpExamApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorize(request).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ExamApi for HttpExamApi {
    async fn list_tests(&self, level: JlptLevel) -> Result<Vec<TestSummary>, ApiError> {
        let url = self.config.tests_url(level)?;
        debug!(%url, "listing tests");
        let body: Vec<TestSummaryDto> = self.send_json(self.client.get(url)).await?;
        body.into_iter()
            .map(|dto| dto.into_summary().map_err(ApiError::from))
            .collect()
    }

    async fn fetch_test(&self, test_id: TestId) -> Result<Test, ApiError> {
        let url = self.config.test_url(test_id)?;
        debug!(%url, "fetching test");
        let body: TestDetailDto = self.send_json(self.client.get(url)).await?;
        Ok(body.into_test()?.redacted())
    }

    async fn submit(
        &self,
        test_id: TestId,
        answers: &[AnswerPair],
    ) -> Result<AttemptResult, ApiError> {
        let url = self.config.submit_url(test_id)?;
        debug!(%url, answers = answers.len(), "submitting answers");
        let payload = SubmitRequest::from_pairs(answers);
        let body: SubmitResponseDto = self.send_json(self.client.post(url).json(&payload)).await?;
        Ok(body.into_result()?)
    }

    async fn fetch_attempt(&self, attempt_id: AttemptId) -> Result<AttemptReview, ApiError> {
        let url = self.config.attempt_url(attempt_id)?;
        debug!(%url, "fetching attempt");
        let body: AttemptDetailDto = self.send_json(self.client.get(url)).await?;
        Ok(body.into_review()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let config = ApiConfig::new("https://nihongo.example/api").unwrap();
        assert_eq!(config.base_url().as_str(), "https://nihongo.example/api/");
    }

    #[test]
    fn endpoints_follow_backend_routes() {
        let config = ApiConfig::new(DEFAULT_API_BASE_URL).unwrap();
        assert_eq!(
            config.tests_url(JlptLevel::N3).unwrap().as_str(),
            "http://localhost:8000/api/jlpt-practice/tests/?level=N3"
        );
        assert_eq!(
            config.test_url(TestId::new(4)).unwrap().as_str(),
            "http://localhost:8000/api/jlpt-practice/tests/4/"
        );
        assert_eq!(
            config.submit_url(TestId::new(4)).unwrap().as_str(),
            "http://localhost:8000/api/jlpt-practice/tests/4/submit/"
        );
        assert_eq!(
            config.attempt_url(AttemptId::new(9)).unwrap().as_str(),
            "http://localhost:8000/api/jlpt-practice/attempts/9/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn token_is_optional() {
        let config = ApiConfig::new(DEFAULT_API_BASE_URL).unwrap();
        assert!(config.token.is_none());
        let config = config.with_token("secret");
        assert_eq!(config.token.as_deref(), Some("secret"));
    }
}
