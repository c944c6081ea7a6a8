use crate::core::aggregator::compute_parent_mark;
use crate::core::auth::acquire_token;
use crate::core::fetcher::fetch_best_record;
use crate::core::hierarchy::PoolHierarchy;
use crate::core::writer::commit_mark;
use crate::domain::model::{AggregateResult, Credentials, UpdateOutcome};
use crate::domain::ports::{GradingApi, RateLimiter};
use crate::utils::error::{GraderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// When a computed mark is allowed to replace the recorded one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum UpdatePolicy {
    /// Update only if the computed mark is higher than the recorded one.
    #[default]
    StrictImprovement,
    /// Also rewrite the record when both marks are equal.
    AllowEqual,
}

impl UpdatePolicy {
    pub fn should_update(&self, current_mark: i64, computed_mark: i64) -> bool {
        match self {
            UpdatePolicy::StrictImprovement => computed_mark > current_mark,
            UpdatePolicy::AllowEqual => computed_mark >= current_mark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    ResolvingHierarchy,
    Authenticating,
    AggregatingChildren,
    FetchingParent,
    DecidingUpdate,
    Committing,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::ResolvingHierarchy => "resolving hierarchy",
            PipelineState::Authenticating => "authenticating",
            PipelineState::AggregatingChildren => "aggregating children",
            PipelineState::FetchingParent => "fetching parent",
            PipelineState::DecidingUpdate => "deciding update",
            PipelineState::Committing => "committing",
            PipelineState::Done => "done",
        };
        f.write_str(name)
    }
}

/// A failed run: the state it stopped in and why.
#[derive(Error, Debug)]
#[error("{stage}: {source}")]
pub struct PipelineError {
    pub stage: PipelineState,
    #[source]
    pub source: GraderError,
}

impl PipelineError {
    pub fn kind(&self) -> &GraderError {
        &self.source
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub credentials: Credentials,
    pub policy: UpdatePolicy,
    pub dry_run: bool,
}

impl PipelineOptions {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            policy: UpdatePolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Recomputes a pool parent's mark from its modules and writes it back.
pub struct GradePipeline<A: GradingApi, L: RateLimiter> {
    api: A,
    limiter: L,
    hierarchy: PoolHierarchy,
    options: PipelineOptions,
}

impl<A: GradingApi, L: RateLimiter> GradePipeline<A, L> {
    pub fn new(api: A, limiter: L, hierarchy: PoolHierarchy, options: PipelineOptions) -> Self {
        Self {
            api,
            limiter,
            hierarchy,
            options,
        }
    }

    pub async fn run(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> std::result::Result<UpdateOutcome, PipelineError> {
        let mut stage = PipelineState::ResolvingHierarchy;
        match self.execute(user_id, project_id, &mut stage).await {
            Ok(outcome) => {
                Self::enter(&mut stage, PipelineState::Done);
                Ok(outcome)
            }
            Err(source) => {
                tracing::debug!("user-{} module-{}: failed while {}", user_id, project_id, stage);
                Err(PipelineError { stage, source })
            }
        }
    }

    fn enter(stage: &mut PipelineState, next: PipelineState) {
        tracing::debug!("🔄 {} -> {}", stage, next);
        *stage = next;
    }

    async fn execute(
        &self,
        user_id: &str,
        project_id: &str,
        stage: &mut PipelineState,
    ) -> Result<UpdateOutcome> {
        let parent_id = self.hierarchy.parent_of(project_id).ok_or_else(|| {
            GraderError::UnknownProjectError {
                project_id: project_id.to_string(),
            }
        })?;
        let children = self.hierarchy.children_of(parent_id);
        tracing::debug!(
            "module {} belongs to {} (project {}, {} modules)",
            project_id,
            self.hierarchy.parent_name(parent_id).unwrap_or("?"),
            parent_id,
            children.len()
        );

        Self::enter(stage, PipelineState::Authenticating);
        let token = acquire_token(&self.api, &self.limiter, &self.options.credentials).await?;

        Self::enter(stage, PipelineState::AggregatingChildren);
        let computed_mark =
            compute_parent_mark(&self.api, &self.limiter, user_id, parent_id, children, &token)
                .await?;

        Self::enter(stage, PipelineState::FetchingParent);
        let parent = fetch_best_record(&self.api, &self.limiter, user_id, parent_id, &token).await?;

        Self::enter(stage, PipelineState::DecidingUpdate);
        let current_mark = parent.mark();
        if !self.options.policy.should_update(current_mark, computed_mark) {
            tracing::info!(
                "nothing updated: current mark for parent ({}) is not lower than new mark ({})",
                current_mark,
                computed_mark
            );
            return Ok(UpdateOutcome::AlreadyUpToDate {
                team_id: parent.team_id,
                current_mark,
                computed_mark,
            });
        }

        let projects_user_id = parent
            .projects_user_id()
            .ok_or(GraderError::MissingProjectsUserError {
                team_id: parent.team_id,
            })?;

        if self.options.dry_run {
            tracing::info!(
                "🔍 dry run: team {} would go from {} to {}",
                parent.team_id,
                current_mark,
                computed_mark
            );
            return Ok(UpdateOutcome::DryRun {
                team_id: parent.team_id,
                current_mark,
                computed_mark,
            });
        }

        Self::enter(stage, PipelineState::Committing);
        let aggregate = AggregateResult {
            parent_id: parent_id.to_string(),
            mark: computed_mark,
            team_id: parent.team_id,
            projects_user_id,
        };
        commit_mark(
            &self.api,
            &self.limiter,
            aggregate.team_id,
            aggregate.projects_user_id,
            aggregate.mark,
            &token,
        )
        .await?;

        tracing::info!(
            "✅ project {} updated: team {} now has mark {}",
            aggregate.parent_id,
            aggregate.team_id,
            aggregate.mark
        );
        Ok(UpdateOutcome::Updated {
            team_id: aggregate.team_id,
            mark: aggregate.mark,
        })
    }
}
