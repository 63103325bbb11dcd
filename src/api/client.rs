//! HTTP client for the LifeQuest backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::backend::LifeQuestApi;
use super::types::{
    ActionResponse, AddBranchResponse, ApiError, CompleteQuestRequest, CompleteQuestResponse,
    ErrorDetail, PrimaryGoalResponse,
};
use crate::config::ApiSettings;
use crate::goals::types::{Goal, GoalDraft, GoalPatch};
use crate::progression::ProgressRecord;
use crate::quests::types::{Branch, Quest};
use crate::session::types::{DailyXpStat, OnboardingData, User, UserRegistration};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// `reqwest`-backed implementation of [`LifeQuestApi`].
pub struct ApiClient {
    /// HTTP client
    http: reqwest::Client,
    /// Base URL without the `/api` prefix
    base_url: String,
    /// Whether the last call reached the server
    online: Arc<AtomicBool>,
}

impl ApiClient {
    /// Create a client for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client from configuration.
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        Self::with_timeout(
            settings.base_url.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            online: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Check if the backend was reachable on the last call.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }

    /// Full URL for an API path such as `/users/1/progress`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                self.set_online(false);
            }
            tracing::warn!("{} {} failed: {}", method, path, e);
            ApiError::from(e)
        })?;
        self.set_online(true);

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(ApiError::from)?;
            // Some endpoints answer with an empty body
            let slice: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
            return serde_json::from_slice(slice).map_err(ApiError::from);
        }

        let detail = response
            .json::<ErrorDetail>()
            .await
            .ok()
            .and_then(|body| body.message());
        tracing::warn!("{} {} returned {}: {:?}", method, path, status, detail);
        Err(classify(status, detail))
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send::<(), R>(Method::GET, path, None).await
    }

    async fn post<B, R>(&self, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(Method::POST, path, body).await
    }
}

fn classify(status: StatusCode, detail: Option<String>) -> ApiError {
    ApiError::from_status(status.as_u16(), detail)
}

#[async_trait]
impl LifeQuestApi for ApiClient {
    async fn register_user(&self, registration: &UserRegistration) -> Result<User, ApiError> {
        self.post("/users/register", Some(registration)).await
    }

    async fn get_user(&self, tg_id: i64) -> Result<User, ApiError> {
        self.get(&format!("/users/{}", tg_id)).await
    }

    async fn get_progress(&self, tg_id: i64) -> Result<ProgressRecord, ApiError> {
        self.get(&format!("/users/{}/progress", tg_id)).await
    }

    async fn complete_onboarding(
        &self,
        tg_id: i64,
        data: &OnboardingData,
    ) -> Result<(), ApiError> {
        let response: ActionResponse = self
            .post(&format!("/users/{}/onboarding", tg_id), Some(data))
            .await?;
        response.into_result("Onboarding refused")
    }

    async fn add_branch(&self, tg_id: i64, branch: Branch) -> Result<Vec<Branch>, ApiError> {
        // The branch travels as a query parameter
        let response: AddBranchResponse = self
            .post::<(), _>(
                &format!("/users/{}/branches/add?branch={}", tg_id, branch.as_str()),
                None,
            )
            .await?;
        Ok(response.active_branches)
    }

    async fn get_quests(&self, tg_id: i64) -> Result<Vec<Quest>, ApiError> {
        self.get(&format!("/users/{}/quests", tg_id)).await
    }

    async fn complete_quest(
        &self,
        tg_id: i64,
        quest_id: Uuid,
    ) -> Result<CompleteQuestResponse, ApiError> {
        let body = CompleteQuestRequest { quest_id };
        self.post(&format!("/users/{}/quests/complete", tg_id), Some(&body))
            .await
    }

    async fn get_goals(&self, tg_id: i64) -> Result<Vec<Goal>, ApiError> {
        self.get(&format!("/users/{}/goals", tg_id)).await
    }

    async fn create_goal(&self, tg_id: i64, draft: &GoalDraft) -> Result<Goal, ApiError> {
        self.post(&format!("/users/{}/goals", tg_id), Some(draft)).await
    }

    async fn update_goal(
        &self,
        tg_id: i64,
        goal_id: Uuid,
        patch: &GoalPatch,
    ) -> Result<Goal, ApiError> {
        self.send(
            Method::PATCH,
            &format!("/users/{}/goals/{}", tg_id, goal_id),
            Some(patch),
        )
        .await
    }

    async fn complete_goal(&self, tg_id: i64, goal_id: Uuid) -> Result<Goal, ApiError> {
        self.post::<(), _>(&format!("/users/{}/goals/{}/complete", tg_id, goal_id), None)
            .await
    }

    async fn notify_goal(&self, tg_id: i64, goal_id: Uuid) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post::<(), _>(&format!("/users/{}/goals/{}/notify", tg_id, goal_id), None)
            .await?;
        Ok(())
    }

    async fn update_primary_goal(
        &self,
        tg_id: i64,
        draft: &GoalDraft,
    ) -> Result<PrimaryGoalResponse, ApiError> {
        self.post(&format!("/users/{}/goal", tg_id), Some(draft)).await
    }

    async fn get_daily_xp(&self, tg_id: i64) -> Result<DailyXpStat, ApiError> {
        self.get(&format!("/users/{}/daily-xp", tg_id)).await
    }

    async fn activate_pro(&self, tg_id: i64) -> Result<(), ApiError> {
        let response: ActionResponse = self
            .post::<(), _>(&format!("/users/{}/pro/activate", tg_id), None)
            .await?;
        response.into_result("PRO activation refused")
    }
}
