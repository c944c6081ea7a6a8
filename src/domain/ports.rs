use crate::domain::model::{AccessToken, Credentials, MarkPatch, MarkTarget, TeamRecord};
use crate::utils::error::{ApiError, AuthError};
use async_trait::async_trait;

/// The three intranet endpoints the grader talks to.
#[async_trait]
pub trait GradingApi: Send + Sync {
    async fn request_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthError>;

    /// Teams of `user_id` on `project_id`, best `final_mark` first.
    async fn list_teams(
        &self,
        user_id: &str,
        project_id: &str,
        token: &AccessToken,
    ) -> Result<Vec<TeamRecord>, ApiError>;

    async fn patch_mark(
        &self,
        target: MarkTarget,
        patch: &MarkPatch,
        token: &AccessToken,
    ) -> Result<(), ApiError>;
}

/// Called once after every remote call, whether it succeeded or not.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn pause(&self);
}
