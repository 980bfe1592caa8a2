use async_trait::async_trait;
use domain::{CommentType, PageId, RawComment};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server returned status {0}")]
    Status(u16),
    /// The request was torn down on purpose. Never logged as a failure.
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub nickname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub identifier: PageId,
    pub comment_type: CommentType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub success: bool,
    pub comment: Option<RawComment>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub success: bool,
    pub likes: i64,
    pub is_liked: bool,
}

/// The server surface the feed talks to. Mocked in tests.
#[async_trait]
pub trait CommentApi: Send + Sync {
    async fn fetch_comments(
        &self,
        identifier: &PageId,
        comment_type: CommentType,
        device_id: &str,
    ) -> Result<Vec<RawComment>, ApiError>;

    async fn submit_comment(&self, comment: &NewComment) -> Result<SubmitOutcome, ApiError>;

    async fn toggle_like(
        &self,
        comment_id: &str,
        comment_type: CommentType,
        device_id: &str,
    ) -> Result<LikeOutcome, ApiError>;
}

/// reqwest-backed implementation against the murmur server routes.
pub struct HttpApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    fn check(status: reqwest::StatusCode) -> Result<(), ApiError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(status.as_u16()))
        }
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

#[async_trait]
impl CommentApi for HttpApi {
    async fn fetch_comments(
        &self,
        identifier: &PageId,
        comment_type: CommentType,
        device_id: &str,
    ) -> Result<Vec<RawComment>, ApiError> {
        let resp = self
            .http
            .get(format!("{}/api/comments", self.base_url))
            .query(&[
                ("identifier", identifier.as_str()),
                ("commentType", comment_type.as_str()),
                ("deviceId", device_id),
            ])
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp.status())?;
        resp.json().await.map_err(transport)
    }

    async fn submit_comment(&self, comment: &NewComment) -> Result<SubmitOutcome, ApiError> {
        let resp = self
            .http
            .post(format!("{}/api/comments", self.base_url))
            .json(comment)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp.status())?;
        resp.json().await.map_err(transport)
    }

    async fn toggle_like(
        &self,
        comment_id: &str,
        comment_type: CommentType,
        device_id: &str,
    ) -> Result<LikeOutcome, ApiError> {
        let resp = self
            .http
            .post(format!("{}/api/comments/like", self.base_url))
            .json(&serde_json::json!({
                "commentId": comment_id,
                "commentType": comment_type,
                "deviceId": device_id,
            }))
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp.status())?;
        resp.json().await.map_err(transport)
    }
}
