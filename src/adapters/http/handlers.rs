//! Route handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::adapters::github::GitHubIssue;
use crate::domain::models::{Membership, MembershipRole, NewUser, Organization, User};
use crate::services::access::primary_organization_id;
use crate::services::{
    parse_label_query, AddUserOutcome, IssueDraft, IssueListRequest, IssueListing, Registration,
    RepositoryListing,
};

use super::auth::CurrentUser;
use super::error::ApiResult;
use super::AppState;

type SharedState = State<Arc<AppState>>;

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub installation_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub organization: Organization,
    pub created: bool,
}

#[derive(Debug, Deserialize)]
pub struct LabelPolicyRequest {
    #[serde(default)]
    pub mandatory_labels: Option<Vec<String>>,
    #[serde(default)]
    pub added_labels: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveUserRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub user_id: i64,
    pub role: MembershipRole,
}

#[derive(Debug, Deserialize)]
pub struct SelectOrganizationRequest {
    pub organization_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SelectRepositoryRequest {
    pub repo: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoriesParams {
    #[serde(default)]
    pub full: bool,
}

#[derive(Debug, Deserialize)]
pub struct IssueListParams {
    #[serde(default)]
    pub labels: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn register(
    State(state): SharedState,
    Json(req): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<Registration>)> {
    let registration = state.registration.register(&req).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

pub async fn list_organizations(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Organization>>> {
    Ok(Json(state.organizations.organizations(&user).await?))
}

pub async fn activate_organization(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ActivateRequest>,
) -> ApiResult<Json<ActivateResponse>> {
    let activated = state
        .organizations
        .activate(&user, &req.installation_id, req.name.as_deref())
        .await?;
    Ok(Json(ActivateResponse {
        organization: activated.organization,
        created: activated.created,
    }))
}

pub async fn update_labels(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Json(req): Json<LabelPolicyRequest>,
) -> ApiResult<Json<Organization>> {
    let organization_id = primary_organization_id(&user)?;
    let organization = state
        .organizations
        .update_labels(&user, organization_id, req.mandatory_labels, req.added_labels)
        .await?;
    Ok(Json(organization))
}

pub async fn add_user(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Json(req): Json<AddUserRequest>,
) -> ApiResult<Json<AddUserOutcome>> {
    let organization_id = primary_organization_id(&user)?;
    Ok(Json(
        state
            .organizations
            .add_user(&user, organization_id, &req.email)
            .await?,
    ))
}

pub async fn remove_user(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Json(req): Json<RemoveUserRequest>,
) -> ApiResult<StatusCode> {
    let organization_id = primary_organization_id(&user)?;
    state
        .organizations
        .remove_user(&user, organization_id, req.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_role(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Json<Membership>> {
    let organization_id = primary_organization_id(&user)?;
    Ok(Json(
        state
            .organizations
            .change_role(&user, organization_id, req.user_id, req.role)
            .await?,
    ))
}

pub async fn select_organization(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Json(req): Json<SelectOrganizationRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(
        state
            .users
            .select_organization(&user, req.organization_id)
            .await?,
    ))
}

pub async fn list_repositories(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Query(params): Query<RepositoriesParams>,
) -> ApiResult<Json<RepositoryListing>> {
    Ok(Json(state.users.repositories(&user, params.full).await?))
}

pub async fn select_repository(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Json(req): Json<SelectRepositoryRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.select_repository(&user, &req.repo).await?))
}

pub async fn list_issues(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Query(params): Query<IssueListParams>,
) -> ApiResult<Json<IssueListing>> {
    let request = IssueListRequest {
        labels: parse_label_query(params.labels.as_deref()),
        page: params.page,
    };
    Ok(Json(state.issues.list(&user, request).await?))
}

pub async fn create_issue(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<IssueDraft>,
) -> ApiResult<(StatusCode, Json<GitHubIssue>)> {
    let issue = state.issues.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

pub async fn update_issue(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Path(number): Path<u64>,
    Json(draft): Json<IssueDraft>,
) -> ApiResult<Json<GitHubIssue>> {
    Ok(Json(state.issues.update(&user, number, draft).await?))
}

pub async fn close_issue(
    State(state): SharedState,
    CurrentUser(user): CurrentUser,
    Path(number): Path<u64>,
) -> ApiResult<Json<GitHubIssue>> {
    Ok(Json(state.issues.close(&user, number).await?))
}
