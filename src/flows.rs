//! Application workflows: validate, call, notify, refetch

use crate::alerts::AlertSender;
use crate::api::models::{
    ApiMessage, Credentials, Invitation, OtpVerification, ProfileUpdate, Project, ProjectInput,
    SignUpRequest, Task, TaskInput, Team, TeamInput, TeamUpdate, User,
};
use crate::api::{make_api_call, ApiClientTrait, ApiError, CallHooks, Outcome};
use crate::forms::FormValues;
use crate::refetch::{QueryCache, QueryKey, RefetchCoordinator, RefetchReport, RefetchSet};
use crate::session::Session;
use crate::wizard::{SubmitBlocked, SubmitOutcome, Wizard};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

pub const OTP_REQUIRED_FOR_EMAIL: &str = "OTP is required to change your email";

/// Everything a signed-in screen needs to run mutations
pub struct Workspace<C> {
    client: Arc<C>,
    cache: Arc<QueryCache<C>>,
    refetcher: RefetchCoordinator<QueryCache<C>>,
    alerts: AlertSender,
}

impl<C: ApiClientTrait> Workspace<C> {
    pub fn new(client: Arc<C>, alerts: AlertSender) -> Self {
        let cache = Arc::new(QueryCache::new(Arc::clone(&client)));
        Self {
            refetcher: RefetchCoordinator::new(Arc::clone(&cache)),
            client,
            cache,
            alerts,
        }
    }

    pub fn cache(&self) -> &QueryCache<C> {
        &self.cache
    }

    pub fn alerts(&self) -> &AlertSender {
        &self.alerts
    }

    /// Reload queries outside of a mutation, e.g. on start-up
    pub async fn refresh(&self, session: &Session, set: &RefetchSet) -> RefetchReport {
        self.refetcher.run(session, set).await
    }

    fn hooks<'a, T>(&self, success: &str) -> CallHooks<'a, T> {
        let on_success = self.alerts.clone();
        let on_error = self.alerts.clone();
        let success = success.to_string();
        CallHooks::new()
            .on_success(move |_| on_success.success(success))
            .on_error(move |info| on_error.error(info.message.clone()))
    }

    /// Submit `wizard` through the orchestrator, then refetch on success
    async fn run_mutation<T, F, Fut>(
        &self,
        wizard: &mut Wizard,
        refetch: Option<(&Session, RefetchSet)>,
        success: &str,
        operation: F,
    ) -> SubmitOutcome<T>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let outcome = wizard.submit(self.hooks(success), operation).await;
        if outcome.is_completed() {
            info!(form = wizard.schema().name(), "Mutation completed");
            if let Some((session, set)) = refetch {
                self.refetcher.run(session, &set).await;
            }
        }
        outcome
    }

    pub async fn sign_up(&self, wizard: &mut Wizard) -> SubmitOutcome<ApiMessage> {
        let client = &self.client;
        self.run_mutation(
            wizard,
            None,
            "Account created, check your email for the OTP",
            |values| async move {
                let request = SignUpRequest::try_from(&values)?;
                client.register(&request).await
            },
        )
        .await
    }

    pub async fn verify_otp(&self, wizard: &mut Wizard, email: &str) -> SubmitOutcome<Session> {
        let client = &self.client;
        self.run_mutation(wizard, None, "Email verified", |values| async move {
            let verification = OtpVerification {
                email: email.to_string(),
                otp: values.text("otp").trim().to_string(),
            };
            client.verify_otp(&verification).await.map(Session::from)
        })
        .await
    }

    pub async fn login(&self, wizard: &mut Wizard) -> SubmitOutcome<Session> {
        let client = &self.client;
        self.run_mutation(wizard, None, "Signed in", |values| async move {
            let credentials = Credentials::try_from(&values)?;
            client.login(&credentials).await.map(Session::from)
        })
        .await
    }

    pub async fn google_sign_in(&self, id_token: &str) -> Outcome<Session> {
        make_api_call(
            || async { self.client.google_sign_in(id_token).await.map(Session::from) },
            self.hooks("Signed in with Google"),
        )
        .await
    }

    pub async fn accept_invitation(&self, token: &str) -> Outcome<ApiMessage> {
        make_api_call(
            || self.client.accept_invitation(token),
            self.hooks("Invitation accepted"),
        )
        .await
    }

    /// Changing the email requires the OTP mailed to the new address
    pub async fn update_profile(
        &self,
        wizard: &mut Wizard,
        session: &Session,
    ) -> SubmitOutcome<User> {
        let values = wizard.values();
        let email_changed = values
            .optional_text("email")
            .is_some_and(|email| !email.eq_ignore_ascii_case(&session.user.email));
        if email_changed && values.optional_text("otp").is_none() {
            wizard.set_error("otp", OTP_REQUIRED_FOR_EMAIL);
            return SubmitOutcome::Blocked(SubmitBlocked::Invalid);
        }

        let client = &self.client;
        self.run_mutation(wizard, None, "Profile updated", |values| async move {
            let update = ProfileUpdate::try_from(&values)?;
            client.update_profile(session, &update).await
        })
        .await
    }

    pub async fn create_project(
        &self,
        wizard: &mut Wizard,
        session: &Session,
    ) -> SubmitOutcome<Project> {
        let client = &self.client;
        self.run_mutation(
            wizard,
            Some((session, RefetchSet::of([QueryKey::Projects]))),
            "Project created",
            |values| async move {
                let input = ProjectInput::try_from(&values)?;
                client.create_project(session, &input).await
            },
        )
        .await
    }

    pub async fn update_project(
        &self,
        wizard: &mut Wizard,
        session: &Session,
        project_id: &str,
    ) -> SubmitOutcome<Project> {
        let client = &self.client;
        let refetch = RefetchSet::of([QueryKey::Projects, QueryKey::Project(project_id.to_string())]);
        self.run_mutation(
            wizard,
            Some((session, refetch)),
            "Project updated",
            |values| async move {
                let input = ProjectInput::try_from(&values)?;
                client.update_project(session, project_id, &input).await
            },
        )
        .await
    }

    pub async fn create_task(
        &self,
        wizard: &mut Wizard,
        session: &Session,
        project_id: &str,
    ) -> SubmitOutcome<Task> {
        let client = &self.client;
        let refetch = RefetchSet::of([
            QueryKey::Tasks(project_id.to_string()),
            QueryKey::Project(project_id.to_string()),
        ]);
        self.run_mutation(
            wizard,
            Some((session, refetch)),
            "Task created",
            |values| async move {
                let input = TaskInput::try_from(&values)?;
                client.create_task(session, project_id, &input).await
            },
        )
        .await
    }

    pub async fn update_task(
        &self,
        wizard: &mut Wizard,
        session: &Session,
        project_id: &str,
        task_id: &str,
    ) -> SubmitOutcome<Task> {
        let client = &self.client;
        self.run_mutation(
            wizard,
            Some((session, RefetchSet::of([QueryKey::Tasks(project_id.to_string())]))),
            "Task updated",
            |values| async move {
                let input = TaskInput::try_from(&values)?;
                client.update_task(session, task_id, &input).await
            },
        )
        .await
    }

    pub async fn create_team(
        &self,
        wizard: &mut Wizard,
        session: &Session,
    ) -> SubmitOutcome<Team> {
        let client = &self.client;
        let refetch = RefetchSet::of([QueryKey::Teams(session.user_id().to_string())]);
        self.run_mutation(
            wizard,
            Some((session, refetch)),
            "Team created",
            |values| async move {
                let input = TeamInput::try_from(&values)?;
                client.create_team(session, &input).await
            },
        )
        .await
    }

    pub async fn update_team(
        &self,
        wizard: &mut Wizard,
        session: &Session,
        team_id: &str,
    ) -> SubmitOutcome<Team> {
        let client = &self.client;
        let refetch = RefetchSet::of([QueryKey::Teams(session.user_id().to_string())]);
        self.run_mutation(
            wizard,
            Some((session, refetch)),
            "Team updated",
            |values| async move {
                let update = TeamUpdate {
                    team_id: team_id.to_string(),
                    team: TeamInput::try_from(&values)?,
                };
                client.update_team(session, &update).await
            },
        )
        .await
    }

    pub async fn invite_member(
        &self,
        wizard: &mut Wizard,
        session: &Session,
    ) -> SubmitOutcome<ApiMessage> {
        let client = &self.client;
        self.run_mutation(
            wizard,
            Some((session, RefetchSet::of([QueryKey::Members]))),
            "Invitation sent",
            |values| async move {
                let invitation = Invitation::try_from(&values)?;
                client.invite_member(session, &invitation).await
            },
        )
        .await
    }
}
