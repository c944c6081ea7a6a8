use crate::domain::model::{AccessToken, MarkPatch, MarkTarget};
use crate::domain::ports::{GradingApi, RateLimiter};
use crate::utils::error::{GraderError, Result};

/// Writes `mark` to the team, then to the projects_user.
///
/// The two writes are not transactional. A failure on the second one leaves
/// the team updated and is reported as `PartialUpdateError`.
pub async fn commit_mark<A, L>(
    api: &A,
    limiter: &L,
    team_id: i64,
    projects_user_id: i64,
    mark: i64,
    token: &AccessToken,
) -> Result<()>
where
    A: GradingApi + ?Sized,
    L: RateLimiter + ?Sized,
{
    let patch = MarkPatch::finished(mark);

    let team = MarkTarget::Team(team_id);
    let result = api.patch_mark(team, &patch, token).await;
    limiter.pause().await;
    result.map_err(|source| GraderError::CommitError {
        target: team,
        source,
    })?;

    let result = api
        .patch_mark(MarkTarget::ProjectsUser(projects_user_id), &patch, token)
        .await;
    limiter.pause().await;
    result.map_err(|source| {
        tracing::error!(
            "❌ team {} holds mark {} but projects_user {} could not be updated",
            team_id,
            mark,
            projects_user_id
        );
        GraderError::PartialUpdateError {
            team_id,
            projects_user_id,
            source,
        }
    })
}
