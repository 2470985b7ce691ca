//! Wire models for the Taskdeck REST API

use crate::forms::{parse_day, FormError, FormValues};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Dates arrive either as plain days or as full timestamps
fn de_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_day))
}

/// Id-only reference to a member; nested user objects are never stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        MemberId(value.to_string())
    }
}

/// Priority shared by projects and tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    ToDo,
    OnProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::OnProgress, TaskStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "TO_DO",
            Self::OnProgress => "ON_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::OnProgress => "On Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

/// Role granted to an invited member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Default,
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl MemberRole {
    pub const ALL: [MemberRole; 5] = [
        MemberRole::Default,
        MemberRole::Owner,
        MemberRole::Admin,
        MemberRole::Editor,
        MemberRole::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Tokens and identity returned by login, OTP verification and Google sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: User,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "ProjectName")]
    pub title: String,
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(default, alias = "Priority")]
    pub priority: Priority,
    #[serde(default, alias = "StartDate", rename = "startDate", deserialize_with = "de_day")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "EndDate", rename = "dueDate", deserialize_with = "de_day")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, alias = "ProjectLead")]
    pub lead: Option<MemberId>,
    #[serde(default)]
    pub members: Vec<MemberId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, deserialize_with = "de_day")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_day")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub assignee: Option<MemberId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "TeamName")]
    pub name: String,
    #[serde(rename = "TeamLead")]
    pub lead: MemberId,
    #[serde(default)]
    pub members: Vec<MemberId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(alias = "_id")]
    pub id: MemberId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default, rename = "joinedAt")]
    pub joined_at: Option<DateTime<Utc>>,
}

/// Plain acknowledgement such as "OTP sent"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Request bodies built from validated form values
// ---------------------------------------------------------------------------

fn required_text(values: &FormValues, field: &str) -> Result<String, FormError> {
    values
        .optional_text(field)
        .ok_or_else(|| FormError::Missing(field.to_string()))
}

fn required_day(values: &FormValues, field: &str) -> Result<NaiveDate, FormError> {
    parse_day(values.text(field)).ok_or_else(|| FormError::Invalid {
        field: field.to_string(),
        reason: "not a date".to_string(),
    })
}

fn member_ids(values: &FormValues, field: &str) -> Vec<MemberId> {
    values
        .list(field)
        .iter()
        .map(|id| MemberId(id.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<&FormValues> for SignUpRequest {
    type Error = FormError;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        Ok(Self {
            username: required_text(values, "username")?,
            email: required_text(values, "email")?,
            password: values.text("password").to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl TryFrom<&FormValues> for Credentials {
    type Error = FormError;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        Ok(Self {
            email: required_text(values, "email")?,
            password: values.text("password").to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpVerification {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

impl TryFrom<&FormValues> for ProfileUpdate {
    type Error = FormError;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required_text(values, "name")?,
            email: values.optional_text("email"),
            otp: values.optional_text("otp"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectInput {
    pub project_name: String,
    pub project_lead: MemberId,
    pub team: Vec<MemberId>,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
}

impl TryFrom<&FormValues> for ProjectInput {
    type Error = FormError;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        let priority = Priority::parse(values.text("Priority")).ok_or_else(|| FormError::Invalid {
            field: "Priority".to_string(),
            reason: "unknown priority".to_string(),
        })?;
        Ok(Self {
            project_name: required_text(values, "ProjectName")?,
            project_lead: MemberId(required_text(values, "ProjectLead")?),
            team: member_ids(values, "Team"),
            priority,
            start_date: required_day(values, "StartDate")?,
            end_date: required_day(values, "EndDate")?,
            description: required_text(values, "Description")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<MemberId>,
}

impl TryFrom<&FormValues> for TaskInput {
    type Error = FormError;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        let priority = Priority::parse(values.text("priority")).ok_or_else(|| FormError::Invalid {
            field: "priority".to_string(),
            reason: "unknown priority".to_string(),
        })?;
        let status = TaskStatus::parse(values.text("status")).ok_or_else(|| FormError::Invalid {
            field: "status".to_string(),
            reason: "unknown status".to_string(),
        })?;
        let progress = match values.get("progress") {
            Some(_) => {
                let raw = values.number("progress").unwrap_or(0);
                Some(u8::try_from(raw.clamp(0, 100)).unwrap_or(100))
            }
            None => None,
        };
        Ok(Self {
            name: required_text(values, "name")?,
            description: required_text(values, "description")?,
            priority,
            status,
            progress,
            start_date: required_day(values, "startDate")?,
            due_date: required_day(values, "dueDate")?,
            module: values.optional_text("module"),
            assignee: values.optional_text("assignee").map(MemberId),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamInput {
    #[serde(rename = "TeamName")]
    pub name: String,
    #[serde(rename = "TeamLead")]
    pub lead: MemberId,
    pub members: Vec<MemberId>,
}

impl TryFrom<&FormValues> for TeamInput {
    type Error = FormError;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required_text(values, "TeamName")?,
            lead: MemberId(required_text(values, "TeamLead")?),
            members: member_ids(values, "members"),
        })
    }
}

/// Team update carries the team id in the body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamUpdate {
    #[serde(rename = "teamId")]
    pub team_id: String,
    #[serde(flatten)]
    pub team: TeamInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invitation {
    pub name: String,
    pub email: String,
    pub projects: Vec<String>,
    pub role: MemberRole,
}

impl TryFrom<&FormValues> for Invitation {
    type Error = FormError;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        let role = MemberRole::parse(values.text("role")).ok_or_else(|| FormError::Invalid {
            field: "role".to_string(),
            reason: "unknown role".to_string(),
        })?;
        Ok(Self {
            name: required_text(values, "name")?,
            email: required_text(values, "email")?,
            projects: values.list("projects").to_vec(),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_priority_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Priority::Medium).unwrap(), json!("MEDIUM"));
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse("Medium"), None);
    }

    #[test]
    fn test_task_status_round_names() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            serde_json::to_value(TaskStatus::OnProgress).unwrap(),
            json!("ON_PROGRESS")
        );
    }

    #[test]
    fn test_member_role_lowercase() {
        assert_eq!(serde_json::to_value(MemberRole::Editor).unwrap(), json!("editor"));
        assert_eq!(MemberRole::parse("viewer"), Some(MemberRole::Viewer));
    }

    #[test]
    fn test_project_accepts_mongo_style_ids() {
        let project: Project = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Apollo",
            "priority": "HIGH",
            "startDate": "2025-01-10",
            "lead": "u1"
        }))
        .unwrap();
        assert_eq!(project.id, "p1");
        assert_eq!(project.priority, Priority::High);
        assert_eq!(project.lead, Some(MemberId::from("u1")));
        assert!(project.members.is_empty());
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn test_task_accepts_timestamps_for_dates() {
        let task: Task = serde_json::from_value(json!({
            "id": "t1",
            "name": "Docs",
            "startDate": "2025-01-10T00:00:00.000Z",
            "dueDate": null
        }))
        .unwrap();
        assert_eq!(task.start_date, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(task.due_date, None);
        assert_eq!(task.status, TaskStatus::ToDo);
    }

    #[test]
    fn test_team_uses_pascal_case_fields() {
        let team: Team = serde_json::from_value(json!({
            "id": "t1",
            "TeamName": "Core",
            "TeamLead": "u1",
            "members": ["u2"]
        }))
        .unwrap();
        assert_eq!(team.lead, MemberId::from("u1"));
        assert_eq!(team.members, vec![MemberId::from("u2")]);
    }

    #[test]
    fn test_project_input_from_values() {
        let values = FormValues::new()
            .with("ProjectName", "Apollo")
            .with("ProjectLead", "u1")
            .with("Team", vec!["u2", "u3"])
            .with("Priority", "LOW")
            .with("StartDate", "2025-01-10")
            .with("EndDate", "2025-02-10")
            .with("Description", "Moon");
        let input = ProjectInput::try_from(&values).unwrap();
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            json!({
                "ProjectName": "Apollo",
                "ProjectLead": "u1",
                "Team": ["u2", "u3"],
                "Priority": "LOW",
                "StartDate": "2025-01-10",
                "EndDate": "2025-02-10",
                "Description": "Moon"
            })
        );
    }

    #[test]
    fn test_task_input_skips_empty_optionals() {
        let values = FormValues::new()
            .with("name", "Write docs")
            .with("description", "All of them")
            .with("priority", "HIGH")
            .with("status", "TO_DO")
            .with("startDate", "2025-01-10")
            .with("dueDate", "2025-01-12")
            .with("module", "")
            .with("assignee", "u9");
        let input = TaskInput::try_from(&values).unwrap();
        assert_eq!(input.module, None);
        assert_eq!(input.assignee, Some(MemberId::from("u9")));
        assert_eq!(input.progress, None);
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("module").is_none());
        assert_eq!(json["dueDate"], json!("2025-01-12"));
    }

    #[test]
    fn test_task_input_clamps_progress() {
        let values = FormValues::new()
            .with("name", "n")
            .with("description", "d")
            .with("priority", "LOW")
            .with("status", "COMPLETED")
            .with("startDate", "2025-01-10")
            .with("dueDate", "2025-01-12")
            .with("progress", 150i64);
        assert_eq!(TaskInput::try_from(&values).unwrap().progress, Some(100));
    }

    #[test]
    fn test_invitation_rejects_unknown_role() {
        let values = FormValues::new()
            .with("name", "Ann")
            .with("email", "ann@x.com")
            .with("projects", vec!["p1"])
            .with("role", "superuser");
        let err = Invitation::try_from(&values).unwrap_err();
        assert!(matches!(err, FormError::Invalid { field, .. } if field == "role"));
    }

    #[test]
    fn test_team_update_flattens_team() {
        let update = TeamUpdate {
            team_id: "t1".into(),
            team: TeamInput {
                name: "Core".into(),
                lead: MemberId::from("u1"),
                members: vec![],
            },
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"teamId": "t1", "TeamName": "Core", "TeamLead": "u1", "members": []})
        );
    }
}
