use crate::domain::model::{AccessToken, Credentials, MarkPatch, MarkTarget, TeamRecord};
use crate::domain::ports::GradingApi;
use crate::utils::error::{ApiError, AuthError, GraderError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.intra.42.fr";
pub const DEFAULT_SCOPE: &str = "public projects";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// reqwest-backed client for the 42 intranet API.
#[derive(Debug, Clone)]
pub struct IntraClient {
    client: Client,
    base_url: Url,
    scope: String,
}

impl IntraClient {
    pub fn new(base_url: &str, scope: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraderError::ConfigError {
                message: format!("cannot build HTTP client: {}", e),
            })?;

        let base_url = Url::parse(base_url).map_err(|e| GraderError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GraderError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url,
            scope: scope.to_string(),
        })
    }

    /// Appends each segment percent-encoded, so ids can never leave their path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn error_body(response: Response) -> (u16, String) {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("could not read error body (status {}): {}", status, e);
                "<unreadable body>".to_string()
            }
        };
        (status, body)
    }
}

#[async_trait::async_trait]
impl GradingApi for IntraClient {
    async fn request_token(&self, credentials: &Credentials) -> std::result::Result<AccessToken, AuthError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let url = self.endpoint(&["oauth", "token"]);
        tracing::debug!("📡 POST {}", url);
        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(AuthError::Transport)?;

        if !response.status().is_success() {
            let (status, body) = Self::error_body(response).await;
            return Err(AuthError::Status { status, body });
        }

        let body = response.text().await.map_err(AuthError::Transport)?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(AuthError::MalformedBody)?;

        if token.access_token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(AccessToken::new(token.access_token))
    }

    async fn list_teams(
        &self,
        user_id: &str,
        project_id: &str,
        token: &AccessToken,
    ) -> std::result::Result<Vec<TeamRecord>, ApiError> {
        let url = self.endpoint(&["v2", "users", user_id, "projects", project_id, "teams"]);

        tracing::debug!("📡 GET {}?sort=-final_mark", url);
        let response = self
            .client
            .get(url.clone())
            .query(&[("sort", "-final_mark")])
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(ApiError::Transport)?;

        if !response.status().is_success() {
            let (status, body) = Self::error_body(response).await;
            return Err(ApiError::Status { status, body });
        }

        let body = response.text().await.map_err(ApiError::Transport)?;
        serde_json::from_str(&body).map_err(ApiError::MalformedBody)
    }

    async fn patch_mark(
        &self,
        target: MarkTarget,
        patch: &MarkPatch,
        token: &AccessToken,
    ) -> std::result::Result<(), ApiError> {
        let (collection, id) = target.resource();
        let url = self.endpoint(&["v2", collection, &id.to_string()]);

        let response = self
            .client
            .patch(url.clone())
            .bearer_auth(token.as_str())
            .json(patch)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        tracing::info!("PATCH on {} with mark {}", url, patch.final_mark);

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => {
                let (status, body) = Self::error_body(response).await;
                Err(ApiError::Status { status, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rate_limit::NoDelay;
    use crate::core::fetcher::fetch_best_record;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;

    fn client(server: &MockServer) -> IntraClient {
        IntraClient::new(&server.base_url(), DEFAULT_SCOPE, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_request_token_sends_client_credentials_form() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .x_www_form_urlencoded_tuple("grant_type", "client_credentials")
                .x_www_form_urlencoded_tuple("client_id", "uid")
                .x_www_form_urlencoded_tuple("client_secret", "secret")
                .x_www_form_urlencoded_tuple("scope", "public projects");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"access_token": "tok", "expires_in": 7200}));
        });

        let token = client(&server)
            .request_token(&Credentials::new("uid", "secret"))
            .await
            .unwrap();

        token_mock.assert();
        assert_eq!(token.as_str(), "tok");
    }

    #[tokio::test]
    async fn test_request_token_failure_modes() {
        let server = MockServer::start();
        let mut rejected = server.mock(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(401).body("invalid_client");
        });

        let api = client(&server);
        let credentials = Credentials::new("uid", "bad");
        match api.request_token(&credentials).await {
            Err(AuthError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        rejected.delete();

        let mut garbage = server.mock(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).body("<html>");
        });
        assert!(matches!(
            api.request_token(&credentials).await,
            Err(AuthError::MalformedBody(_))
        ));
        garbage.delete();

        server.mock(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(serde_json::json!({"token_type": "bearer"}));
        });
        assert!(matches!(
            api.request_token(&credentials).await,
            Err(AuthError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn test_list_teams_sorts_by_mark_with_bearer() {
        let server = MockServer::start();
        let teams_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/jdoe/projects/1255/teams")
                .query_param("sort", "-final_mark")
                .header("Authorization", "Bearer tok");
            then.status(200).json_body(serde_json::json!([
                {"id": 1, "project_id": 1255, "final_mark": 90, "validated?": true,
                 "users": [{"projects_user_id": 11}]}
            ]));
        });

        let teams = client(&server)
            .list_teams("jdoe", "1255", &AccessToken::new("tok"))
            .await
            .unwrap();

        teams_mock.assert();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].mark(), 90);
    }

    #[tokio::test]
    async fn test_list_teams_keeps_ids_inside_their_segment() {
        let server = MockServer::start();
        let hijacked = server.mock(|when, then| {
            when.method(GET).path("/v2/teams/5/projects/1255/teams");
            then.status(200).json_body(serde_json::json!([
                {"id": 5, "project_id": 1255, "final_mark": 125, "validated?": true,
                 "users": [{"projects_user_id": 50}]}
            ]));
        });

        let result = client(&server)
            .list_teams("jdoe/../../teams/5", "1255", &AccessToken::new("tok"))
            .await;

        hijacked.assert_hits(0);
        match result {
            Err(ApiError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected 404, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_reports_malformed_team_list() {
        let server = MockServer::start();
        let mut html = server.mock(|when, then| {
            when.method(GET).path("/v2/users/jdoe/projects/1255/teams");
            then.status(200).body("<html>maintenance</html>");
        });

        let api = client(&server);
        let token = AccessToken::new("tok");
        let err = fetch_best_record(&api, &NoDelay, "jdoe", "1255", &token)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GraderError::RemoteError {
                source: ApiError::MalformedBody(_),
                ..
            }
        ));
        html.delete();

        // 物件而非陣列
        server.mock(|when, then| {
            when.method(GET).path("/v2/users/jdoe/projects/1255/teams");
            then.status(200).json_body(serde_json::json!({"error": "Not a list"}));
        });
        let err = fetch_best_record(&api, &NoDelay, "jdoe", "1255", &token)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GraderError::RemoteError {
                source: ApiError::MalformedBody(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_reports_unreachable_api() {
        let api = IntraClient::new("http://127.0.0.1:1", DEFAULT_SCOPE, Duration::from_secs(2)).unwrap();

        let err = fetch_best_record(&api, &NoDelay, "jdoe", "1255", &AccessToken::new("tok"))
            .await
            .unwrap_err();

        match err {
            GraderError::RemoteError {
                operation,
                source: ApiError::Transport(_),
            } => assert!(operation.contains("1255")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_base_url_must_be_a_base() {
        assert!(IntraClient::new("mailto:ops@example.com", DEFAULT_SCOPE, Duration::from_secs(1)).is_err());
        assert!(IntraClient::new("not a url", DEFAULT_SCOPE, Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_patch_mark_accepts_no_content_and_rejects_errors() {
        let server = MockServer::start();
        let team_mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/v2/teams/5")
                .header("Authorization", "Bearer tok")
                .json_body(serde_json::json!({"final_mark": 80, "status": "finished"}));
            then.status(204);
        });
        server.mock(|when, then| {
            when.method(PATCH).path("/v2/projects_users/6");
            then.status(422).body("Unprocessable");
        });

        let api = client(&server);
        let token = AccessToken::new("tok");
        let patch = MarkPatch::finished(80);

        assert!(api.patch_mark(MarkTarget::Team(5), &patch, &token).await.is_ok());
        team_mock.assert();

        match api.patch_mark(MarkTarget::ProjectsUser(6), &patch, &token).await {
            Err(ApiError::Status { status, .. }) => assert_eq!(status, 422),
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
