//! In-memory doubles for the grading API and the rate limiter.

use crate::domain::model::{AccessToken, Credentials, MarkPatch, MarkTarget, TeamRecord, TeamUser};
use crate::domain::ports::{GradingApi, RateLimiter};
use crate::utils::error::{ApiError, AuthError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Token,
    ListTeams { user_id: String, project_id: String },
    Patch { target: MarkTarget, patch: MarkPatch },
}

#[derive(Default)]
struct MockState {
    token_status: Option<u16>,
    teams: HashMap<String, Vec<TeamRecord>>,
    failing_projects: HashMap<String, u16>,
    failing_patches: HashSet<MarkTarget>,
    calls: Vec<ApiCall>,
}

#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_team(self, project_id: &str, team: TeamRecord) -> Self {
        self.state
            .lock()
            .await
            .teams
            .entry(project_id.to_string())
            .or_default()
            .push(team);
        self
    }

    pub async fn with_token_status(self, status: u16) -> Self {
        self.state.lock().await.token_status = Some(status);
        self
    }

    pub async fn with_failing_project(self, project_id: &str, status: u16) -> Self {
        self.state
            .lock()
            .await
            .failing_projects
            .insert(project_id.to_string(), status);
        self
    }

    pub async fn with_failing_patch(self, target: MarkTarget) -> Self {
        self.state.lock().await.failing_patches.insert(target);
        self
    }

    pub async fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn fetched_projects(&self) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::ListTeams { project_id, .. } => Some(project_id),
                _ => None,
            })
            .collect()
    }

    pub async fn patches(&self) -> Vec<(MarkTarget, MarkPatch)> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::Patch { target, patch } => Some((target, patch)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl GradingApi for MockApi {
    async fn request_token(&self, _credentials: &Credentials) -> Result<AccessToken, AuthError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::Token);
        match state.token_status {
            Some(status) => Err(AuthError::Status {
                status,
                body: "rejected".to_string(),
            }),
            None => Ok(AccessToken::new("mock-token")),
        }
    }

    async fn list_teams(
        &self,
        user_id: &str,
        project_id: &str,
        _token: &AccessToken,
    ) -> Result<Vec<TeamRecord>, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::ListTeams {
            user_id: user_id.to_string(),
            project_id: project_id.to_string(),
        });
        if let Some(status) = state.failing_projects.get(project_id) {
            return Err(ApiError::Status {
                status: *status,
                body: String::new(),
            });
        }
        let mut teams = state.teams.get(project_id).cloned().unwrap_or_default();
        teams.sort_by_key(|team| std::cmp::Reverse(team.mark()));
        Ok(teams)
    }

    async fn patch_mark(
        &self,
        target: MarkTarget,
        patch: &MarkPatch,
        _token: &AccessToken,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::Patch {
            target,
            patch: patch.clone(),
        });
        if state.failing_patches.contains(&target) {
            return Err(ApiError::Status {
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingLimiter {
    pauses: AtomicUsize,
}

impl CountingLimiter {
    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RateLimiter for CountingLimiter {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn team(team_id: i64, project_id: i64, mark: i64, validated: bool) -> TeamRecord {
    TeamRecord {
        team_id,
        project_id,
        final_mark: Some(mark),
        validated: Some(validated),
        users: vec![TeamUser {
            projects_user_id: team_id * 10,
        }],
    }
}
