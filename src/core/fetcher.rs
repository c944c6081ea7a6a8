use crate::domain::model::{AccessToken, TeamRecord};
use crate::domain::ports::{GradingApi, RateLimiter};
use crate::utils::error::{GraderError, Result};

/// Best recorded attempt of `user_id` on `project_id`.
///
/// The API is asked for teams sorted by descending `final_mark`, so the first
/// team is the best one. A user who never registered to the project is an
/// error, not a zero mark.
pub async fn fetch_best_record<A, L>(
    api: &A,
    limiter: &L,
    user_id: &str,
    project_id: &str,
    token: &AccessToken,
) -> Result<TeamRecord>
where
    A: GradingApi + ?Sized,
    L: RateLimiter + ?Sized,
{
    let result = api.list_teams(user_id, project_id, token).await;
    limiter.pause().await;

    let teams = result.map_err(|e| {
        GraderError::remote(
            format!("fetching project {} for user {}", project_id, user_id),
            e,
        )
    })?;

    let best = teams
        .into_iter()
        .next()
        .ok_or_else(|| GraderError::EmptyResultError {
            user_id: user_id.to_string(),
            project_id: project_id.to_string(),
        })?;

    tracing::debug!(
        "  fetched project-{}: {{team_id: {}, validated?: {}, mark: {}}}",
        best.project_id,
        best.team_id,
        best.is_validated(),
        best.mark()
    );
    Ok(best)
}
