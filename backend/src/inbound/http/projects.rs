//! Project handlers: creation, metadata, target regions, and members.
//!
//! ```text
//! GET /api/v1/projects
//! POST /api/v1/projects {"title":"Kyoto in spring","prefectures":["京都府"],"invitees":[]}
//! GET|PATCH /api/v1/projects/{id}/meta
//! GET|PUT /api/v1/projects/{id}/prefectures {"prefectures":["京都府","大阪府"]}
//! GET|POST /api/v1/projects/{id}/members {"friendIds":[...],"role":"viewer"}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CreateProjectRequest, Error, Invitee, Prefecture, Project, ProjectDescription,
    ProjectListing, ProjectMember, ProjectMetaPatch, ProjectRole, ProjectTitle, TripDates, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::UserSummaryBody;
use crate::inbound::http::invites::InviteSummaryBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, invalid_item_error, parse_email, parse_optional_date,
    parse_prefecture_list, parse_project_path, parse_user_id, parse_user_id_list, present,
};

/// Project metadata and target regions.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    #[schema(format = "date")]
    pub start_date: Option<String>,
    #[schema(format = "date")]
    pub end_date: Option<String>,
    pub prefectures: Vec<String>,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Project> for ProjectBody {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.to_string(),
            owner_id: project.owner_id.to_string(),
            title: project.title.into(),
            description: project.description.map(String::from),
            start_date: project.dates.start().map(|date| date.to_string()),
            end_date: project.dates.end().map(|date| date.to_string()),
            prefectures: prefecture_names(project.prefectures),
            updated_at: project.updated_at.to_rfc3339(),
        }
    }
}

/// A project together with the caller's role in it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListingBody {
    #[serde(flatten)]
    pub project: ProjectBody,
    #[schema(example = "owner")]
    pub role: String,
}

impl From<ProjectListing> for ProjectListingBody {
    fn from(listing: ProjectListing) -> Self {
        Self {
            project: listing.project.into(),
            role: listing.role.as_str().to_owned(),
        }
    }
}

/// Either an accepted friend or an email address to invite.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteeInput {
    #[schema(format = "uuid")]
    pub friend_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBody {
    pub title: String,
    pub description: Option<String>,
    #[schema(format = "date")]
    pub start_date: Option<String>,
    #[schema(format = "date")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub prefectures: Vec<String>,
    #[serde(default)]
    pub invitees: Vec<InviteeInput>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectResponse {
    #[schema(format = "uuid")]
    pub project_id: String,
    pub invites: InviteSummaryBody,
}

/// Metadata fields to change. `null` clears optional fields.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetaPatchBody {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, format = "date")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<Option<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrefecturesBody {
    #[schema(example = json!(["京都府", "大阪府"]))]
    pub prefectures: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberBody {
    pub user: UserSummaryBody,
    #[schema(example = "editor")]
    pub role: String,
    #[schema(example = "active")]
    pub status: String,
}

impl From<ProjectMember> for MemberBody {
    fn from(member: ProjectMember) -> Self {
        Self {
            user: member.user.into(),
            role: member.role.as_str().to_owned(),
            status: member.status.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMembersBody {
    pub friend_ids: Vec<String>,
    /// `editor` (default) or `viewer`.
    pub role: Option<String>,
}

fn prefecture_names(prefectures: Vec<Prefecture>) -> Vec<String> {
    prefectures.into_iter().map(String::from).collect()
}

fn parse_title(raw: String) -> Result<ProjectTitle, Error> {
    ProjectTitle::new(raw).map_err(|err| invalid_field_error(FieldName::new("title"), err))
}

fn parse_description(raw: Option<String>) -> Result<Option<ProjectDescription>, Error> {
    raw.map(|value| {
        ProjectDescription::new(value)
            .map_err(|err| invalid_field_error(FieldName::new("description"), err))
    })
    .transpose()
}

fn parse_invitees(inputs: Vec<InviteeInput>) -> Result<Vec<Invitee>, Error> {
    let field = FieldName::new("invitees");
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| match (input.friend_id, input.email) {
            (Some(friend_id), None) => parse_user_id(&friend_id, field)
                .map(Invitee::Friend)
                .map_err(|_| invalid_item_error(field, index, friend_id, "friendId must be a valid UUID")),
            (None, Some(email)) => parse_email(&email, field)
                .map(Invitee::Email)
                .map_err(|err| invalid_item_error(field, index, email, err.message())),
            _ => Err(invalid_item_error(
                field,
                index,
                "",
                "each invitee needs exactly one of friendId or email",
            )),
        })
        .collect()
}

fn parse_create_body(
    owner_id: UserId,
    body: CreateProjectBody,
) -> Result<CreateProjectRequest, Error> {
    let start = parse_optional_date(body.start_date.as_deref(), FieldName::new("startDate"))?;
    let end = parse_optional_date(body.end_date.as_deref(), FieldName::new("endDate"))?;
    let dates = TripDates::new(start, end)
        .map_err(|err| invalid_field_error(FieldName::new("endDate"), err))?;
    Ok(CreateProjectRequest {
        owner_id,
        title: parse_title(body.title)?,
        description: parse_description(body.description)?,
        dates,
        prefectures: parse_prefecture_list(&body.prefectures, FieldName::new("prefectures"))?,
        invitees: parse_invitees(body.invitees)?,
    })
}

fn parse_meta_patch(body: ProjectMetaPatchBody) -> Result<ProjectMetaPatch, Error> {
    let title = body.title.map(parse_title).transpose()?;
    let description = body.description.map(parse_description).transpose()?;
    let start_date = body
        .start_date
        .map(|value| parse_optional_date(value.as_deref(), FieldName::new("startDate")))
        .transpose()?;
    let end_date = body
        .end_date
        .map(|value| parse_optional_date(value.as_deref(), FieldName::new("endDate")))
        .transpose()?;
    Ok(ProjectMetaPatch {
        title,
        description,
        start_date,
        end_date,
    })
}

fn parse_member_role(raw: Option<&str>) -> Result<ProjectRole, Error> {
    raw.map_or(Ok(ProjectRole::Editor), |value| {
        ProjectRole::from_str(value).map_err(|err| invalid_field_error(FieldName::new("role"), err))
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Caller's projects, most recently updated first", body = [ProjectListingBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ProjectListingBody>>> {
    let actor = session.require_user_id()?;
    let listings = state.projects_query.list(&actor).await?;
    Ok(web::Json(listings.into_iter().map(Into::into).collect()))
}

/// Create a project owned by the caller.
///
/// Friends listed in `invitees` join as active editors in the same
/// transaction; email invitees receive invite links afterwards.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectBody,
    responses(
        (status = 201, description = "Project created", body = CreateProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProjectBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = parse_create_body(actor, payload.into_inner())?;
    let created = state.projects.create(request).await?;
    Ok(HttpResponse::Created().json(CreateProjectResponse {
        project_id: created.project.id.to_string(),
        invites: InviteSummaryBody::from(created.invites),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/meta",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Project metadata", body = ProjectBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "getProjectMeta"
)]
#[get("/projects/{id}/meta")]
pub async fn get_project_meta(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProjectBody>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let project = state.projects_query.meta(&actor, &project_id).await?;
    Ok(web::Json(project.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}/meta",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = ProjectMetaPatchBody,
    responses(
        (status = 200, description = "Updated metadata", body = ProjectBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Editor role required", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "updateProjectMeta"
)]
#[patch("/projects/{id}/meta")]
pub async fn update_project_meta(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProjectMetaPatchBody>,
) -> ApiResult<web::Json<ProjectBody>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let patch = parse_meta_patch(payload.into_inner())?;
    let project = state
        .projects
        .update_meta(&actor, &project_id, patch)
        .await?;
    Ok(web::Json(project.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/prefectures",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Target regions", body = PrefecturesBody),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "getProjectPrefectures"
)]
#[get("/projects/{id}/prefectures")]
pub async fn get_prefectures(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PrefecturesBody>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let project = state.projects_query.meta(&actor, &project_id).await?;
    Ok(web::Json(PrefecturesBody {
        prefectures: prefecture_names(project.prefectures),
    }))
}

/// Replace the target regions. Unknown names are rejected; duplicates collapse.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/prefectures",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = PrefecturesBody,
    responses(
        (status = 200, description = "Stored regions", body = PrefecturesBody),
        (status = 400, description = "Unknown prefecture", body = ErrorSchema),
        (status = 403, description = "Editor role required", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "replaceProjectPrefectures"
)]
#[put("/projects/{id}/prefectures")]
pub async fn replace_prefectures(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PrefecturesBody>,
) -> ApiResult<web::Json<PrefecturesBody>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let prefectures = parse_prefecture_list(&payload.prefectures, FieldName::new("prefectures"))?;
    let stored = state
        .projects
        .replace_prefectures(&actor, &project_id, prefectures)
        .await?;
    Ok(web::Json(PrefecturesBody {
        prefectures: prefecture_names(stored),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/members",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Members", body = [MemberBody]),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "listProjectMembers"
)]
#[get("/projects/{id}/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MemberBody>>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let members = state.projects_query.members(&actor, &project_id).await?;
    Ok(web::Json(members.into_iter().map(Into::into).collect()))
}

/// Add accepted friends as members. Existing members are left unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/members",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = AddMembersBody,
    responses(
        (status = 200, description = "Members after the change", body = [MemberBody]),
        (status = 400, description = "Not a friend or invalid role", body = ErrorSchema),
        (status = 403, description = "Editor role required", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "addProjectMembers"
)]
#[post("/projects/{id}/members")]
pub async fn add_members(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AddMembersBody>,
) -> ApiResult<web::Json<Vec<MemberBody>>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let friend_ids = parse_user_id_list(&payload.friend_ids, FieldName::new("friendIds"))?;
    let role = parse_member_role(payload.role.as_deref())?;
    let members = state
        .projects
        .add_members(&actor, &project_id, friend_ids, role)
        .await?;
    Ok(web::Json(members.into_iter().map(Into::into).collect()))
}
