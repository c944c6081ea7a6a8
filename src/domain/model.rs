use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the pool list: a parent project and the modules it is graded from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolProject {
    pub parent_name: String,
    pub parent_id: String,
    #[serde(default)]
    pub children_ids: Vec<String>,
}

/// A team attempt as returned by `GET /v2/users/:user/projects/:project/teams`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamRecord {
    #[serde(rename = "id")]
    pub team_id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub final_mark: Option<i64>,
    #[serde(rename = "validated?", default)]
    pub validated: Option<bool>,
    #[serde(default)]
    pub users: Vec<TeamUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamUser {
    pub projects_user_id: i64,
}

impl TeamRecord {
    /// Ungraded teams come back with a null mark.
    pub fn mark(&self) -> i64 {
        self.final_mark.unwrap_or(0)
    }

    pub fn is_validated(&self) -> bool {
        self.validated.unwrap_or(false)
    }

    pub fn projects_user_id(&self) -> Option<i64> {
        self.users.first().map(|user| user.projects_user_id)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// The mark about to be written for a parent project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    pub parent_id: String,
    pub mark: i64,
    pub team_id: i64,
    pub projects_user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The recorded mark already satisfies the update policy.
    AlreadyUpToDate {
        team_id: i64,
        current_mark: i64,
        computed_mark: i64,
    },
    Updated {
        team_id: i64,
        mark: i64,
    },
    /// An update was due but the run was a dry run.
    DryRun {
        team_id: i64,
        current_mark: i64,
        computed_mark: i64,
    },
}

/// A record that receives the final mark on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkTarget {
    Team(i64),
    ProjectsUser(i64),
}

impl MarkTarget {
    /// API collection and id of the record.
    pub fn resource(&self) -> (&'static str, i64) {
        match self {
            MarkTarget::Team(id) => ("teams", *id),
            MarkTarget::ProjectsUser(id) => ("projects_users", *id),
        }
    }

    pub fn path(&self) -> String {
        let (collection, id) = self.resource();
        format!("/v2/{}/{}", collection, id)
    }
}

impl fmt::Display for MarkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkTarget::Team(id) => write!(f, "team {}", id),
            MarkTarget::ProjectsUser(id) => write!(f, "projects_user {}", id),
        }
    }
}

/// Body of both commit PATCH requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkPatch {
    pub final_mark: i64,
    pub status: String,
}

impl MarkPatch {
    pub fn finished(final_mark: i64) -> Self {
        Self {
            final_mark,
            status: "finished".to_string(),
        }
    }
}
