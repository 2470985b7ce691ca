//! REST client for the Taskdeck backend

use super::error::ApiError;
use super::models::{
    ApiMessage, AuthPayload, Credentials, Invitation, Member, OtpVerification, ProfileUpdate,
    Project, ProjectInput, SignUpRequest, Task, TaskInput, Team, TeamInput, TeamUpdate, User,
};
use crate::config::ClientConfig;
use crate::session::Session;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Remote operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClientTrait: Send + Sync {
    /// Register a new account; the server mails an OTP
    async fn register(&self, request: &SignUpRequest) -> Result<ApiMessage, ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError>;

    async fn verify_otp(&self, verification: &OtpVerification) -> Result<AuthPayload, ApiError>;

    /// Exchange a Google ID token for a session
    async fn google_sign_in(&self, token: &str) -> Result<AuthPayload, ApiError>;

    async fn accept_invitation(&self, token: &str) -> Result<ApiMessage, ApiError>;

    async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError>;

    async fn list_projects(&self, session: &Session) -> Result<Vec<Project>, ApiError>;

    async fn get_project(&self, session: &Session, project_id: &str) -> Result<Project, ApiError>;

    async fn create_project(
        &self,
        session: &Session,
        input: &ProjectInput,
    ) -> Result<Project, ApiError>;

    async fn update_project(
        &self,
        session: &Session,
        project_id: &str,
        input: &ProjectInput,
    ) -> Result<Project, ApiError>;

    async fn list_tasks(&self, session: &Session, project_id: &str) -> Result<Vec<Task>, ApiError>;

    async fn create_task(
        &self,
        session: &Session,
        project_id: &str,
        input: &TaskInput,
    ) -> Result<Task, ApiError>;

    async fn update_task(
        &self,
        session: &Session,
        task_id: &str,
        input: &TaskInput,
    ) -> Result<Task, ApiError>;

    async fn list_members(&self, session: &Session) -> Result<Vec<Member>, ApiError>;

    async fn invite_member(
        &self,
        session: &Session,
        invitation: &Invitation,
    ) -> Result<ApiMessage, ApiError>;

    async fn list_teams(&self, session: &Session, user_id: &str) -> Result<Vec<Team>, ApiError>;

    async fn create_team(&self, session: &Session, input: &TeamInput) -> Result<Team, ApiError>;

    async fn update_team(&self, session: &Session, update: &TeamUpdate) -> Result<Team, ApiError>;
}

/// Default backend address
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";

/// `reqwest`-backed implementation of [`ApiClientTrait`]
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            &config.api_base_url(),
            Duration::from_secs(config.request_timeout_secs()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, session: &Session, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(session.bearer())
    }

    fn post(&self, session: Option<&Session>, path: &str) -> RequestBuilder {
        let request = self.client.post(self.url(path));
        match session {
            Some(session) => request.bearer_auth(session.bearer()),
            None => request,
        }
    }

    fn patch(&self, session: &Session, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(session.bearer())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let payload = payload_of(&bytes);
        debug!(status = status.as_u16(), "API response");

        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                payload,
            });
        }
        Ok(payload)
    }

    async fn send_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        decode_data(self.send(request).await?)
    }

    async fn send_message(&self, request: RequestBuilder) -> Result<ApiMessage, ApiError> {
        decode_message(self.send(request).await?)
    }
}

impl Default for HttpApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, Duration::from_secs(30))
    }
}

/// Parse a response body; non-JSON bodies become a JSON string
fn payload_of(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).trim().to_string()))
}

/// Unwrap the `{ data, message }` envelope, accepting bare bodies too
fn decode_data<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    let body = match payload {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(body)
        .map_err(|e| ApiError::raw(format!("Unexpected response from server: {e}")))
}

fn decode_message(payload: Value) -> Result<ApiMessage, ApiError> {
    match payload {
        Value::Null => Ok(ApiMessage::default()),
        Value::String(message) => Ok(ApiMessage { message }),
        other => serde_json::from_value(other)
            .map_err(|e| ApiError::raw(format!("Unexpected response from server: {e}"))),
    }
}

#[async_trait]
impl ApiClientTrait for HttpApiClient {
    async fn register(&self, request: &SignUpRequest) -> Result<ApiMessage, ApiError> {
        self.send_message(self.post(None, "/api/user/register").json(request))
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError> {
        self.send_data(self.post(None, "/api/user/login").json(credentials))
            .await
    }

    async fn verify_otp(&self, verification: &OtpVerification) -> Result<AuthPayload, ApiError> {
        self.send_data(self.post(None, "/api/user/verifyOtp").json(verification))
            .await
    }

    async fn google_sign_in(&self, token: &str) -> Result<AuthPayload, ApiError> {
        self.send_data(
            self.post(None, "/api/user/googleSignIn")
                .json(&json!({ "token": token })),
        )
        .await
    }

    async fn accept_invitation(&self, token: &str) -> Result<ApiMessage, ApiError> {
        self.send_message(
            self.post(None, "/api/user/acceptInvitation")
                .json(&json!({ "token": token })),
        )
        .await
    }

    async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        self.send_data(self.patch(session, "/userapi/user/updateprofile").json(update))
            .await
    }

    async fn list_projects(&self, session: &Session) -> Result<Vec<Project>, ApiError> {
        self.send_data(self.get(session, "/userapi/user/getuserprojects"))
            .await
    }

    async fn get_project(&self, session: &Session, project_id: &str) -> Result<Project, ApiError> {
        self.send_data(self.get(session, &format!("/userapi/user/getproject/{project_id}")))
            .await
    }

    async fn create_project(
        &self,
        session: &Session,
        input: &ProjectInput,
    ) -> Result<Project, ApiError> {
        self.send_data(
            self.post(Some(session), "/userapi/user/initiateproject")
                .json(input),
        )
        .await
    }

    async fn update_project(
        &self,
        session: &Session,
        project_id: &str,
        input: &ProjectInput,
    ) -> Result<Project, ApiError> {
        self.send_data(
            self.patch(session, &format!("/userapi/user/updateproject/{project_id}"))
                .json(input),
        )
        .await
    }

    async fn list_tasks(&self, session: &Session, project_id: &str) -> Result<Vec<Task>, ApiError> {
        self.send_data(self.get(session, &format!("/taskapi/tasks/{project_id}")))
            .await
    }

    async fn create_task(
        &self,
        session: &Session,
        project_id: &str,
        input: &TaskInput,
    ) -> Result<Task, ApiError> {
        self.send_data(
            self.post(Some(session), &format!("/taskapi/create/{project_id}"))
                .json(input),
        )
        .await
    }

    async fn update_task(
        &self,
        session: &Session,
        task_id: &str,
        input: &TaskInput,
    ) -> Result<Task, ApiError> {
        self.send_data(
            self.patch(session, &format!("/taskapi/update/{task_id}"))
                .json(input),
        )
        .await
    }

    async fn list_members(&self, session: &Session) -> Result<Vec<Member>, ApiError> {
        self.send_data(self.get(session, "/userapi/user/members"))
            .await
    }

    async fn invite_member(
        &self,
        session: &Session,
        invitation: &Invitation,
    ) -> Result<ApiMessage, ApiError> {
        self.send_message(
            self.post(Some(session), "/userapi/user/invitemember")
                .json(invitation),
        )
        .await
    }

    async fn list_teams(&self, session: &Session, user_id: &str) -> Result<Vec<Team>, ApiError> {
        self.send_data(self.get(session, &format!("/teamapi/user-teams/{user_id}")))
            .await
    }

    async fn create_team(&self, session: &Session, input: &TeamInput) -> Result<Team, ApiError> {
        self.send_data(self.post(Some(session), "/teamapi/create").json(input))
            .await
    }

    async fn update_team(&self, session: &Session, update: &TeamUpdate) -> Result<Team, ApiError> {
        self.send_data(self.patch(session, "/teamapi/updateteam").json(update))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorInfo;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpApiClient::new("http://api.test/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://api.test");
        assert_eq!(client.url("/teamapi/create"), "http://api.test/teamapi/create");
        assert_eq!(client.url("taskapi/tasks/p1"), "http://api.test/taskapi/tasks/p1");
    }

    #[test]
    fn test_default_client_points_at_localhost() {
        assert_eq!(HttpApiClient::default().base_url(), DEFAULT_API_BASE_URL);
    }

    mod payloads {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_empty_body_is_null() {
            assert_eq!(payload_of(b""), Value::Null);
        }

        #[test]
        fn test_plain_text_body_becomes_string() {
            assert_eq!(payload_of(b"Bad Gateway\n"), Value::String("Bad Gateway".into()));
        }

        #[test]
        fn test_envelope_is_unwrapped() {
            let payload = json!({"data": [{"_id": "m1", "name": "Ann", "email": "a@x.com"}], "message": "ok"});
            let users: Vec<User> = decode_data(payload).unwrap();
            assert_eq!(users.len(), 1);
            assert_eq!(users[0].id, "m1");
        }

        #[test]
        fn test_bare_body_is_accepted() {
            let payload = json!({"_id": "m1", "name": "Ann", "email": "a@x.com"});
            let user: User = decode_data(payload).unwrap();
            assert_eq!(user.name, "Ann");
        }

        #[test]
        fn test_shape_mismatch_has_readable_message() {
            let err = decode_data::<User>(json!({"data": 7})).unwrap_err();
            let info = ErrorInfo::from(&err);
            assert!(info.message.starts_with("Unexpected response from server"));
        }

        #[test]
        fn test_message_bodies() {
            assert_eq!(
                decode_message(json!({"message": "OTP sent"})).unwrap().message,
                "OTP sent"
            );
            assert_eq!(decode_message(Value::String("done".into())).unwrap().message, "done");
            assert_eq!(decode_message(Value::Null).unwrap(), ApiMessage::default());
        }
    }
}
