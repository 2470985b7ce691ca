//! Schemas for every form in the application

use super::schema::{CrossFieldRule, FieldSchema, FormSchema, SchemaError};
use crate::api::models::{MemberRole, Priority, TaskStatus};

const DIGITS_ONLY: &str = r"^[0-9]+$";
const OTP_LENGTH: usize = 6;

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const OTP_DIGITS_ONLY: &str = "OTP must contain only numbers";
pub const OTP_LENGTH_MESSAGE: &str = "OTP must be 6 digits";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const START_IN_PAST: &str = "Start date cannot be in the past";
pub const END_BEFORE_START: &str = "End date must be after start date";
pub const DUE_BEFORE_START: &str = "Due date must be after start date";
pub const PRIORITY_INVALID: &str = "Priority must be Low, Medium, or High";
pub const STATUS_INVALID: &str = "Status must be To Do, On Progress, or Completed";
pub const ROLE_INVALID: &str = "Please select a valid role";
pub const PROJECTS_EMPTY: &str = "Select at least one project";

fn priority_options() -> Vec<&'static str> {
    Priority::ALL.iter().map(Priority::as_str).collect()
}

fn status_options() -> Vec<&'static str> {
    TaskStatus::ALL.iter().map(TaskStatus::as_str).collect()
}

fn role_options() -> Vec<&'static str> {
    MemberRole::ALL.iter().map(MemberRole::as_str).collect()
}

fn otp_field(required: bool) -> Result<FieldSchema, SchemaError> {
    let field = FieldSchema::text("otp", "OTP");
    let field = if required {
        field.required("OTP is required")
    } else {
        field
    };
    Ok(field
        .pattern(DIGITS_ONLY, OTP_DIGITS_ONLY)?
        .min_length(OTP_LENGTH, OTP_LENGTH_MESSAGE)
        .max_length(OTP_LENGTH, OTP_LENGTH_MESSAGE))
}

pub fn sign_up() -> Result<FormSchema, SchemaError> {
    FormSchema::builder("sign_up")
        .field(FieldSchema::text("username", "Username").required("Username is required"))
        .field(
            FieldSchema::text("email", "Email")
                .required(INVALID_EMAIL)
                .email(INVALID_EMAIL),
        )
        .field(
            FieldSchema::secret("password", "Password")
                .required("Password must be at least 6 characters long")
                .min_length(6, "Password must be at least 6 characters long"),
        )
        .field(
            FieldSchema::secret("confirmPassword", "Confirm Password")
                .required("Confirm Password is required"),
        )
        .cross(CrossFieldRule::matches(
            "password",
            "confirmPassword",
            PASSWORDS_DO_NOT_MATCH,
        ))
        .build()
}

pub fn login() -> Result<FormSchema, SchemaError> {
    FormSchema::builder("login")
        .field(
            FieldSchema::text("email", "Email")
                .required(INVALID_EMAIL)
                .email(INVALID_EMAIL),
        )
        .field(
            FieldSchema::secret("password", "Password")
                .required("Password must be at least 6 characters long")
                .min_length(6, "Password must be at least 6 characters long"),
        )
        .build()
}

pub fn verify_otp() -> Result<FormSchema, SchemaError> {
    FormSchema::builder("verify_otp")
        .field(otp_field(true)?)
        .build()
}

pub fn edit_profile() -> Result<FormSchema, SchemaError> {
    FormSchema::builder("edit_profile")
        .field(
            FieldSchema::text("name", "Name")
                .required("Name must be at least 2 characters long")
                .min_length(2, "Name must be at least 2 characters long"),
        )
        .field(FieldSchema::text("email", "Email").email(INVALID_EMAIL))
        .field(otp_field(false)?)
        .build()
}

pub fn project() -> Result<FormSchema, SchemaError> {
    FormSchema::builder("project")
        .field(FieldSchema::text("ProjectName", "Project Name").required("Project name is required"))
        .field(FieldSchema::text("ProjectLead", "Project Lead").required("Project lead is required"))
        .field(FieldSchema::multi_select("Team", "Team"))
        .field(
            FieldSchema::choice("Priority", "Priority", &priority_options(), PRIORITY_INVALID)
                .required(PRIORITY_INVALID)
                .with_default(Priority::Low.as_str()),
        )
        .field(
            FieldSchema::date("StartDate", "Start Date")
                .required("Start date is required")
                .valid_date("Invalid start date format")
                .not_in_past(START_IN_PAST),
        )
        .field(
            FieldSchema::date("EndDate", "End Date")
                .required("End date is required")
                .valid_date("Invalid end date format"),
        )
        .field(FieldSchema::multiline("Description", "Description").required("Description is required"))
        .cross(CrossFieldRule::date_order("StartDate", "EndDate", END_BEFORE_START))
        .build()
}

fn task_fields(start_may_be_past: bool) -> Vec<FieldSchema> {
    let start = FieldSchema::date("startDate", "Start Date")
        .required("Start date is required")
        .valid_date("Invalid start date format");
    let start = if start_may_be_past {
        start
    } else {
        start.not_in_past(START_IN_PAST)
    };

    vec![
        FieldSchema::text("name", "Task Name").required("Task name is required"),
        FieldSchema::multiline("description", "Description").required("Description is required"),
        FieldSchema::choice("priority", "Priority", &priority_options(), PRIORITY_INVALID)
            .required(PRIORITY_INVALID)
            .with_default(Priority::Low.as_str()),
        FieldSchema::choice("status", "Status", &status_options(), STATUS_INVALID)
            .required(STATUS_INVALID)
            .with_default(TaskStatus::ToDo.as_str()),
        start,
        FieldSchema::date("dueDate", "Due Date")
            .required("Due date is required")
            .valid_date("Invalid due date format"),
        FieldSchema::text("module", "Module"),
        FieldSchema::text("assignee", "Assignee"),
    ]
}

pub fn task_create() -> Result<FormSchema, SchemaError> {
    task_fields(false)
        .into_iter()
        .fold(FormSchema::builder("task_create"), |b, f| b.field(f))
        .cross(CrossFieldRule::date_order("startDate", "dueDate", DUE_BEFORE_START))
        .build()
}

pub fn task_update() -> Result<FormSchema, SchemaError> {
    task_fields(true)
        .into_iter()
        .fold(FormSchema::builder("task_update"), |b, f| b.field(f))
        .field(
            FieldSchema::number("progress", "Progress (%)")
                .range(0, 100, "Progress must be between 0 and 100"),
        )
        .cross(CrossFieldRule::date_order("startDate", "dueDate", DUE_BEFORE_START))
        .build()
}

pub fn team() -> Result<FormSchema, SchemaError> {
    FormSchema::builder("team")
        .field(FieldSchema::text("TeamName", "Team Name").required("Team name is required"))
        .field(FieldSchema::text("TeamLead", "Team Lead").required("Team lead is required"))
        .field(FieldSchema::multi_select("members", "Members"))
        .build()
}

/// Field names of each invite step, in order
pub const INVITE_STEPS: [&[&str]; 3] = [&["name", "email"], &["projects"], &["role"]];

pub fn invite_member() -> Result<FormSchema, SchemaError> {
    FormSchema::builder("invite_member")
        .field(
            FieldSchema::text("name", "Name")
                .required("Name must be at least 2 characters long")
                .min_length(2, "Name must be at least 2 characters long"),
        )
        .field(
            FieldSchema::text("email", "Email")
                .required(INVALID_EMAIL)
                .email(INVALID_EMAIL),
        )
        .field(
            FieldSchema::multi_select("projects", "Projects")
                .required(PROJECTS_EMPTY)
                .min_items(1, PROJECTS_EMPTY),
        )
        .field(
            FieldSchema::choice("role", "Role", &role_options(), ROLE_INVALID)
                .required(ROLE_INVALID)
                .with_default(MemberRole::Default.as_str()),
        )
        .build()
}
