//! Session-authenticated DSM API client
//!
//! One client instance serves one DSM device. Every call goes through
//! [`DsmClient::execute`], which logs in on demand, signs the request
//! with the session token, and classifies the outcome as success, an
//! API-level error, or a transport error.

use serde_json::json;
use tracing::{debug, error, warn};

use crate::config::DsmConfig;
use crate::dsm::constants::*;
use crate::dsm::models::{ApiResponse, AuthData};
use crate::dsm::session::{Credentials, Session, SessionStore};
use crate::error::{DsmError, ErrorCode, TaskRunError};

/// HTTP client for the DSM web API of a single device
#[derive(Debug)]
pub struct DsmClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    sessions: SessionStore,
    compound_run_task: bool,
}

impl DsmClient {
    /// Build a client for the device described by `config`
    pub fn new(config: &DsmConfig) -> Result<Self, reqwest::Error> {
        let base_url = config.base_url();
        Self::with_base_url(config, base_url)
    }

    /// Build a client against an explicit base URL (used by tests to
    /// point at a mock server)
    pub fn with_base_url(
        config: &DsmConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        // Cookie store mirrors the browser session DSM expects alongside
        // the SynoToken parameter.
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials: Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            sessions: SessionStore::new(),
            compound_run_task: config.compound_run_task,
        })
    }

    /// Snapshot of the current session, if authenticated
    pub async fn session(&self) -> Option<Session> {
        self.sessions.current().await
    }

    /// Log in if no valid session exists, returning the active session
    ///
    /// Holding the store lock across the login call keeps concurrent
    /// callers from racing a half-established session.
    pub async fn login(&self) -> Result<Session, DsmError> {
        let mut slot = self.sessions.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }

        let session = self.perform_login().await?;
        *slot = Some(session.clone());
        Ok(session)
    }

    /// Execute one signed API call and classify the result
    ///
    /// `params` must not contain the reserved `SynoToken` key; the
    /// current session token is attached here. If no session exists the
    /// call logs in first, and a login failure propagates to the caller
    /// the same way a request failure would.
    pub async fn execute(
        &self,
        api: &str,
        version: &str,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, DsmError> {
        debug_assert!(
            params.iter().all(|(key, _)| *key != PARAM_SYNO_TOKEN),
            "the {} parameter is reserved for the client",
            PARAM_SYNO_TOKEN
        );

        let session = self.login().await?;

        let mut query: Vec<(&str, String)> = vec![
            ("api", api.to_string()),
            ("version", version.to_string()),
            ("method", method.to_string()),
        ];
        query.extend(params.iter().map(|(k, v)| (*k, v.clone())));
        query.push((PARAM_SYNO_TOKEN, session.token));

        debug!(api, method, "executing DSM call");
        let body = self.raw_request(&query).await?;

        if !body.success {
            let code = body.error_code();
            if code.is_session_expired() {
                warn!(api, method, %code, "DSM session expired, forcing re-login");
                self.sessions.invalidate().await;
            }
            return Err(DsmError::Api(code));
        }

        Ok(body)
    }

    /// Fetch one page of scheduler tasks, sorted by name
    pub async fn task_list(&self) -> Result<ApiResponse, DsmError> {
        self.execute(
            API_TASK_SCHEDULER,
            API_TASK_SCHEDULER_VERSION,
            METHOD_LIST,
            &[
                ("sort_by", TASK_SORT_BY.to_string()),
                ("sort_direction", TASK_SORT_DIRECTION.to_string()),
                ("limit", TASK_LIMIT.to_string()),
                ("offset", TASK_OFFSET.to_string()),
            ],
        )
        .await
    }

    /// Fetch the most recent backup log entries, filtered server-side
    /// to integrity-check completion events
    pub async fn backup_logs(&self) -> Result<ApiResponse, DsmError> {
        self.execute(
            API_BACKUP_LOG,
            API_BACKUP_LOG_VERSION,
            METHOD_LIST,
            &[
                ("limit", LOG_LIMIT.to_string()),
                ("offset", LOG_OFFSET.to_string()),
                (PARAM_FILTER_KEYWORD, INTEGRITY_CHECK_EVENT.to_string()),
            ],
        )
        .await
    }

    /// Fetch the last-run result of one backup task
    pub async fn backup_task_result(&self, task_id: i64) -> Result<ApiResponse, DsmError> {
        self.execute(
            API_BACKUP_TASK,
            API_BACKUP_TASK_VERSION,
            METHOD_RESULT,
            &[(PARAM_TASK_ID, task_id.to_string())],
        )
        .await
    }

    /// Fetch the live status/progress of one backup task
    pub async fn backup_task_status(&self, task_id: i64) -> Result<ApiResponse, DsmError> {
        self.execute(
            API_BACKUP_TASK,
            API_BACKUP_TASK_VERSION,
            METHOD_STATUS,
            &[(PARAM_TASK_ID, task_id.to_string())],
        )
        .await
    }

    /// Ask the scheduler to run a task by name
    ///
    /// Fire-and-forget: success means the request was accepted, not
    /// that the task completed. No retry.
    pub async fn run_task(&self, name: &str) -> Result<(), TaskRunError> {
        let result = if self.compound_run_task {
            self.run_task_compound(name).await
        } else {
            self.execute(
                API_EVENT_SCHEDULER,
                API_EVENT_SCHEDULER_VERSION,
                METHOD_RUN,
                &[(PARAM_TASK_NAME, name.to_string())],
            )
            .await
        };

        match result {
            Ok(_) => {
                debug!(task = name, "run-task request accepted");
                Ok(())
            }
            Err(source) => {
                error!(task = name, %source, "run-task request failed");
                Err(TaskRunError {
                    task: name.to_string(),
                    source,
                })
            }
        }
    }

    /// Alternate run-task transport shape: the direct call wrapped as a
    /// JSON-encoded inner call inside a compound-request envelope
    async fn run_task_compound(&self, name: &str) -> Result<ApiResponse, DsmError> {
        let inner = json!([{
            "api": API_EVENT_SCHEDULER,
            "version": API_EVENT_SCHEDULER_VERSION,
            "method": METHOD_RUN,
            (PARAM_TASK_NAME): name,
        }]);
        self.execute(
            API_ENTRY_REQUEST,
            API_ENTRY_REQUEST_VERSION,
            METHOD_REQUEST,
            &[(PARAM_COMPOUND, inner.to_string())],
        )
        .await
    }

    /// Perform the login call itself; the caller holds the session lock
    async fn perform_login(&self) -> Result<Session, DsmError> {
        let query: Vec<(&str, String)> = vec![
            ("api", API_AUTH.to_string()),
            ("version", API_AUTH_VERSION.to_string()),
            ("method", METHOD_LOGIN.to_string()),
            (PARAM_ENABLE_SYNO_TOKEN, VALUE_YES.to_string()),
            (PARAM_ACCOUNT, self.credentials.username.clone()),
            (PARAM_PASSWD, self.credentials.password.clone()),
        ];

        debug!(account = %self.credentials.username, "logging in to DSM");
        let body = match self.raw_request(&query).await {
            Ok(body) => body,
            Err(err) => {
                error!(%err, "DSM login transport failure");
                return Err(DsmError::Auth(ErrorCode::UNKNOWN));
            }
        };

        if !body.success {
            let code = body.error_code();
            error!(%code, "DSM login rejected");
            return Err(DsmError::Auth(code));
        }

        let data = body
            .data
            .and_then(|value| serde_json::from_value::<AuthData>(value).ok())
            .unwrap_or_default();

        match (data.sid, data.synotoken) {
            (Some(sid), Some(token)) => {
                debug!("DSM login succeeded");
                Ok(Session { sid, token })
            }
            _ => {
                error!("DSM login response missing sid or synotoken");
                Err(DsmError::Auth(ErrorCode::UNKNOWN))
            }
        }
    }

    /// Issue the HTTP call; any connection or JSON-decode failure is a
    /// transport error
    async fn raw_request(&self, query: &[(&str, String)]) -> Result<ApiResponse, DsmError> {
        let response = self.http.get(&self.base_url).query(query).send().await?;
        let body: ApiResponse = response.json().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DsmConfig;
    use mockito::{Matcher, Server, ServerGuard};
    use serial_test::serial;

    fn test_config() -> DsmConfig {
        DsmConfig {
            host: "localhost".to_string(),
            port: 5001,
            use_ssl: false,
            verify_ssl: true,
            username: "monitor".to_string(),
            password: "secret".to_string(),
            compound_run_task: false,
        }
    }

    fn client_for(server: &ServerGuard) -> DsmClient {
        DsmClient::with_base_url(&test_config(), format!("{}/webapi/entry.cgi", server.url()))
            .unwrap()
    }

    fn compound_client_for(server: &ServerGuard) -> DsmClient {
        let config = DsmConfig {
            compound_run_task: true,
            ..test_config()
        };
        DsmClient::with_base_url(&config, format!("{}/webapi/entry.cgi", server.url())).unwrap()
    }

    async fn mock_login(server: &mut ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api".into(), "SYNO.API.Auth".into()),
                Matcher::UrlEncoded("method".into(), "login".into()),
                Matcher::UrlEncoded("version".into(), "7".into()),
                Matcher::UrlEncoded("enable_syno_token".into(), "yes".into()),
                Matcher::UrlEncoded("account".into(), "monitor".into()),
                Matcher::UrlEncoded("passwd".into(), "secret".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"success": true, "data": {"sid": "sid-1", "synotoken": "tok-1"}}"#)
            .create_async()
            .await
    }

    #[tokio::test]
    #[serial]
    async fn login_populates_sid_and_token() {
        let mut server = Server::new_async().await;
        let login = mock_login(&mut server).await;

        let client = client_for(&server);
        let session = client.login().await.unwrap();

        login.assert_async().await;
        assert_eq!(session.sid, "sid-1");
        assert_eq!(session.token, "tok-1");
        assert!(client.session().await.is_some());
    }

    #[tokio::test]
    #[serial]
    async fn login_failure_is_auth_error_and_leaves_no_session() {
        let mut server = Server::new_async().await;
        let login = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::UrlEncoded("api".into(), "SYNO.API.Auth".into()))
            .with_status(200)
            .with_body(r#"{"success": false, "error": {"code": 400}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.login().await.unwrap_err();

        login.assert_async().await;
        assert!(matches!(err, DsmError::Auth(ErrorCode(Some(400)))));
        assert!(client.session().await.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn execute_signs_request_with_session_token() {
        let mut server = Server::new_async().await;
        let login = mock_login(&mut server).await;
        let call = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api".into(), "SYNO.Core.TaskScheduler".into()),
                Matcher::UrlEncoded("method".into(), "list".into()),
                Matcher::UrlEncoded("version".into(), "3".into()),
                Matcher::UrlEncoded("sort_by".into(), "name".into()),
                Matcher::UrlEncoded("SynoToken".into(), "tok-1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"success": true, "data": {"tasks": []}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let body = client.task_list().await.unwrap();

        login.assert_async().await;
        call.assert_async().await;
        assert!(body.success);
        assert!(body.data.is_some());
    }

    #[tokio::test]
    #[serial]
    async fn api_error_without_code_uses_unknown_sentinel() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _call = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::UrlEncoded(
                "api".into(),
                "SYNO.Core.TaskScheduler".into(),
            ))
            .with_status(200)
            .with_body(r#"{"success": false}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.task_list().await.unwrap_err();
        match err {
            DsmError::Api(code) => assert_eq!(code.to_string(), "unknown"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn non_json_body_is_transport_error() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _call = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::UrlEncoded(
                "api".into(),
                "SYNO.Core.TaskScheduler".into(),
            ))
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.task_list().await.unwrap_err();
        assert!(matches!(err, DsmError::Transport(_)));
    }

    #[tokio::test]
    #[serial]
    async fn session_expiry_code_invalidates_session() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _call = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::UrlEncoded(
                "api".into(),
                "SYNO.Core.TaskScheduler".into(),
            ))
            .with_status(200)
            .with_body(r#"{"success": false, "error": {"code": 106}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.task_list().await.unwrap_err();

        assert!(matches!(err, DsmError::Api(ErrorCode(Some(106)))));
        // The failed request is not retried; the next one re-logins.
        assert!(client.session().await.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn run_task_direct_shape() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let run = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api".into(), "SYNO.Core.EventScheduler".into()),
                Matcher::UrlEncoded("method".into(), "run".into()),
                Matcher::UrlEncoded("version".into(), "1".into()),
                Matcher::UrlEncoded("task_name".into(), "Daily Backup".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        client.run_task("Daily Backup").await.unwrap();
        run.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn run_task_compound_shape() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let run = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api".into(), "SYNO.Entry.Request".into()),
                Matcher::UrlEncoded("method".into(), "request".into()),
                Matcher::Regex("compound=.*SYNO\\.Core\\.EventScheduler.*".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let client = compound_client_for(&server);
        client.run_task("Daily Backup").await.unwrap();
        run.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn run_task_failure_carries_code_and_task_name() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _run = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::UrlEncoded(
                "api".into(),
                "SYNO.Core.EventScheduler".into(),
            ))
            .with_status(200)
            .with_body(r#"{"success": false, "error": {"code": 119}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.run_task("Sync Media").await.unwrap_err();

        assert_eq!(err.task, "Sync Media");
        assert!(matches!(err.source, DsmError::Api(ErrorCode(Some(119)))));
    }

    #[tokio::test]
    #[serial]
    async fn login_happens_once_across_calls() {
        let mut server = Server::new_async().await;
        let login = mock_login(&mut server).await;
        let _call = server
            .mock("GET", "/webapi/entry.cgi")
            .match_query(Matcher::UrlEncoded(
                "api".into(),
                "SYNO.Core.TaskScheduler".into(),
            ))
            .with_status(200)
            .with_body(r#"{"success": true, "data": {"tasks": []}}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        client.task_list().await.unwrap();
        client.task_list().await.unwrap();
        login.assert_async().await;
    }
}
