use crate::domain::model::{AccessToken, Credentials};
use crate::domain::ports::{GradingApi, RateLimiter};
use crate::utils::error::Result;

/// Exchanges the application credentials for a bearer token. No retry.
pub async fn acquire_token<A, L>(api: &A, limiter: &L, credentials: &Credentials) -> Result<AccessToken>
where
    A: GradingApi + ?Sized,
    L: RateLimiter + ?Sized,
{
    tracing::debug!("🔑 requesting access token for client {}", credentials.client_id);
    let result = api.request_token(credentials).await;
    limiter.pause().await;

    let token = result?;
    tracing::debug!("🔑 access token acquired");
    Ok(token)
}
