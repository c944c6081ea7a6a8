use crate::core::fetcher::fetch_best_record;
use crate::domain::model::AccessToken;
use crate::domain::ports::{GradingApi, RateLimiter};
use crate::utils::error::{GraderError, Result};

/// Integer average of the children's best marks.
///
/// Every child must be validated: the first unvalidated or unfetchable child
/// aborts the computation and the remaining children are not fetched. A pool
/// without children aggregates to 0.
pub async fn compute_parent_mark<A, L>(
    api: &A,
    limiter: &L,
    user_id: &str,
    parent_id: &str,
    children: &[String],
    token: &AccessToken,
) -> Result<i64>
where
    A: GradingApi + ?Sized,
    L: RateLimiter + ?Sized,
{
    if children.is_empty() {
        return Ok(0);
    }

    tracing::debug!("calculating final mark for project-{}", parent_id);
    let mut total = 0i64;
    for child_id in children {
        let child = fetch_best_record(api, limiter, user_id, child_id, token).await?;
        if !child.is_validated() {
            return Err(GraderError::UnvalidatedChildError {
                user_id: user_id.to_string(),
                child_id: child_id.clone(),
                project_id: child.project_id,
            });
        }
        total += child.mark();
    }

    Ok(total / children.len() as i64)
}
