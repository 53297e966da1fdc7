//! PostgreSQL-backed `ProjectRepository` using Diesel ORM.
//!
//! A project spans three tables: `projects`, `project_prefectures` and
//! `project_members`. Writes touching more than one of them run in a single
//! transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ProjectMetaUpdate, ProjectRepository, ProjectRepositoryError};
use crate::domain::{
    MemberStatus, NewProject, Prefecture, Project, ProjectDescription, ProjectId, ProjectListing,
    ProjectMember, ProjectRole, ProjectTitle, TripDates, UserId,
};

use super::conversions::row_to_summary;
use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    MemberRow, NewMemberRow, NewPrefectureRow, NewProjectRow, ProjectMetaChangeset, ProjectRow,
    UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{project_members, project_prefectures, projects, users};

/// Diesel-backed implementation of the `ProjectRepository` port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProjectRepositoryError {
    map_basic_pool_error(error, ProjectRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProjectRepositoryError {
    map_basic_diesel_error(
        error,
        ProjectRepositoryError::query,
        ProjectRepositoryError::connection,
    )
}

fn stored_prefectures(project_id: Uuid, names: Vec<String>) -> Vec<Prefecture> {
    let mut prefectures: Vec<Prefecture> = names
        .into_iter()
        .filter_map(|name| {
            Prefecture::new(&name)
                .inspect_err(|_| {
                    tracing::warn!(%project_id, region = %name, "ignoring unknown stored region");
                })
                .ok()
        })
        .collect();
    prefectures.sort_by_key(|p| p.as_str());
    prefectures
}

fn row_to_project(row: ProjectRow, names: Vec<String>) -> Result<Project, ProjectRepositoryError> {
    let invalid = |field: &str, err: &dyn std::fmt::Display| {
        ProjectRepositoryError::query(format!("stored project {} has invalid {field}: {err}", row.id))
    };
    let title = ProjectTitle::new(&row.title).map_err(|err| invalid("title", &err))?;
    let description = row
        .description
        .clone()
        .map(ProjectDescription::new)
        .transpose()
        .map_err(|err| invalid("description", &err))?;
    let dates =
        TripDates::new(row.start_date, row.end_date).map_err(|err| invalid("dates", &err))?;
    Ok(Project {
        id: ProjectId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        title,
        description,
        dates,
        prefectures: stored_prefectures(row.id, names),
        updated_at: row.updated_at,
    })
}

fn parse_role(raw: &str) -> Result<ProjectRole, ProjectRepositoryError> {
    raw.parse::<ProjectRole>()
        .map_err(|err| ProjectRepositoryError::query(err.to_string()))
}

fn row_to_member(
    (member, user): (MemberRow, UserRow),
) -> Result<ProjectMember, ProjectRepositoryError> {
    Ok(ProjectMember {
        project_id: ProjectId::from_uuid(member.project_id),
        user: row_to_summary(user).map_err(ProjectRepositoryError::query)?,
        role: parse_role(&member.role)?,
        status: MemberStatus::from_storage(&member.status),
    })
}

async fn load_prefecture_names(
    conn: &mut AsyncPgConnection,
    project_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<String>>, diesel::result::Error> {
    let rows: Vec<(Uuid, String)> = project_prefectures::table
        .filter(project_prefectures::project_id.eq_any(project_ids))
        .select((project_prefectures::project_id, project_prefectures::name))
        .load(conn)
        .await?;
    let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (project_id, name) in rows {
        grouped.entry(project_id).or_default().push(name);
    }
    Ok(grouped)
}

async fn load_project(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<(ProjectRow, Vec<String>)>, diesel::result::Error> {
    let Some(row) = projects::table
        .find(id)
        .select(ProjectRow::as_select())
        .first(conn)
        .await
        .optional()?
    else {
        return Ok(None);
    };
    let mut names = load_prefecture_names(conn, vec![id]).await?;
    Ok(Some((row, names.remove(&id).unwrap_or_default())))
}

fn member_row(project_id: Uuid, user_id: Uuid, role: ProjectRole, status: MemberStatus) -> NewMemberRow<'static> {
    NewMemberRow {
        project_id,
        user_id,
        role: role.as_str(),
        status: status.as_str(),
    }
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn create(&self, project: &NewProject) -> Result<Project, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *project.id.as_uuid();
        let owner = *project.owner_id.as_uuid();
        let new_row = NewProjectRow {
            id,
            owner_id: owner,
            title: project.title.as_str(),
            description: project.description.as_ref().map(ProjectDescription::as_str),
            start_date: project.dates.start(),
            end_date: project.dates.end(),
            created_at: project.created_at,
            updated_at: project.created_at,
        };
        let prefectures: Vec<NewPrefectureRow<'_>> = project
            .prefectures
            .iter()
            .map(|p| NewPrefectureRow {
                project_id: id,
                name: p.as_str(),
            })
            .collect();
        let members: Vec<NewMemberRow<'_>> =
            std::iter::once(member_row(id, owner, ProjectRole::Owner, MemberStatus::Active))
                .chain(project.editors.iter().map(|editor| {
                    member_row(id, *editor.as_uuid(), ProjectRole::Editor, MemberStatus::Active)
                }))
                .collect();

        let stored = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(projects::table)
                        .values(&new_row)
                        .execute(conn)
                        .await?;
                    if !prefectures.is_empty() {
                        diesel::insert_into(project_prefectures::table)
                            .values(&prefectures)
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await?;
                    }
                    diesel::insert_into(project_members::table)
                        .values(&members)
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                    load_project(conn, id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        let (row, names) =
            stored.ok_or_else(|| ProjectRepositoryError::query("created project vanished"))?;
        row_to_project(row, names)
    }

    async fn find(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_project(&mut conn, *id.as_uuid())
            .await
            .map_err(map_diesel_error)?
            .map(|(row, names)| row_to_project(row, names))
            .transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProjectListing>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ProjectRow, String)> = project_members::table
            .inner_join(projects::table)
            .filter(project_members::user_id.eq(user_id.as_uuid()))
            .filter(project_members::status.eq(MemberStatus::Active.as_str()))
            .order_by(projects::updated_at.desc())
            .select((ProjectRow::as_select(), project_members::role))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids = rows.iter().map(|(row, _)| row.id).collect();
        let mut names = load_prefecture_names(&mut conn, ids)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(row, role)| {
                let prefectures = names.remove(&row.id).unwrap_or_default();
                Ok(ProjectListing {
                    project: row_to_project(row, prefectures)?,
                    role: parse_role(&role)?,
                })
            })
            .collect()
    }

    async fn find_member(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Option<ProjectMember>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        project_members::table
            .inner_join(users::table)
            .filter(project_members::project_id.eq(project_id.as_uuid()))
            .filter(project_members::user_id.eq(user_id.as_uuid()))
            .select((MemberRow::as_select(), UserRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_member)
            .transpose()
    }

    async fn update_meta(
        &self,
        project_id: &ProjectId,
        update: &ProjectMetaUpdate,
    ) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = ProjectMetaChangeset {
            title: update.patch.title.as_ref().map(ProjectTitle::as_str),
            description: update
                .patch
                .description
                .as_ref()
                .map(|d| d.as_ref().map(ProjectDescription::as_str)),
            start_date: Some(update.dates.start()),
            end_date: Some(update.dates.end()),
            updated_at: update.updated_at,
        };
        let updated = diesel::update(projects::table.find(project_id.as_uuid()))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Ok(None);
        }
        load_project(&mut conn, *project_id.as_uuid())
            .await
            .map_err(map_diesel_error)?
            .map(|(row, names)| row_to_project(row, names))
            .transpose()
    }

    async fn replace_prefectures(
        &self,
        project_id: &ProjectId,
        prefectures: &[Prefecture],
        updated_at: DateTime<Utc>,
    ) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *project_id.as_uuid();
        let rows: Vec<NewPrefectureRow<'_>> = prefectures
            .iter()
            .map(|p| NewPrefectureRow {
                project_id: id,
                name: p.as_str(),
            })
            .collect();
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    project_prefectures::table.filter(project_prefectures::project_id.eq(id)),
                )
                .execute(conn)
                .await?;
                if !rows.is_empty() {
                    diesel::insert_into(project_prefectures::table)
                        .values(&rows)
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                }
                diesel::update(projects::table.find(id))
                    .set(projects::updated_at.eq(updated_at))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_members(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ProjectMember>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(MemberRow, UserRow)> = project_members::table
            .inner_join(users::table)
            .filter(project_members::project_id.eq(project_id.as_uuid()))
            .order_by(users::email)
            .select((MemberRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut members = rows
            .into_iter()
            .map(row_to_member)
            .collect::<Result<Vec<_>, _>>()?;
        // Stable sort keeps the email order within each role.
        members.sort_by(|a, b| b.role.cmp(&a.role));
        Ok(members)
    }

    async fn add_members(
        &self,
        project_id: &ProjectId,
        user_ids: &[UserId],
        role: ProjectRole,
        status: MemberStatus,
    ) -> Result<usize, ProjectRepositoryError> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewMemberRow<'_>> = user_ids
            .iter()
            .map(|user_id| member_row(*project_id.as_uuid(), *user_id.as_uuid(), role, status))
            .collect();
        diesel::insert_into(project_members::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
