//! Shared trip projects and their membership.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, Prefecture, ProjectId, UserId, UserSummary};

/// Maximum length of a project title.
pub const TITLE_MAX: usize = 100;
/// Maximum length of a project description.
pub const DESCRIPTION_MAX: usize = 2000;

/// Validation errors for project metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("title must be between 1 and {max} characters")]
    TitleLength { max: usize },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("end date must not be before start date")]
    EndBeforeStart,
}

/// Role of a member within a project, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Viewer,
    Editor,
    Owner,
}

impl ProjectRole {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown project role: {0}")]
pub struct UnknownProjectRole(pub String);

impl FromStr for ProjectRole {
    type Err = UnknownProjectRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "editor" => Ok(Self::Editor),
            "owner" => Ok(Self::Owner),
            other => Err(UnknownProjectRole(other.to_owned())),
        }
    }
}

/// Participation state of a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Invited,
    Active,
}

impl MemberStatus {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Active => "active",
        }
    }

    /// Parse the storage form, treating unknown values as `invited` so they
    /// never grant access.
    pub fn from_storage(raw: &str) -> Self {
        if raw == "active" {
            Self::Active
        } else {
            Self::Invited
        }
    }
}

/// Validated project title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectTitle(String);

impl ProjectTitle {
    /// Trim and validate a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if length == 0 || length > TITLE_MAX {
            return Err(ProjectValidationError::TitleLength { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ProjectTitle> for String {
    fn from(value: ProjectTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProjectTitle {
    type Error = ProjectValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated project description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectDescription(String);

impl ProjectDescription {
    pub fn new(raw: impl Into<String>) -> Result<Self, ProjectValidationError> {
        let raw = raw.into();
        if raw.chars().count() > DESCRIPTION_MAX {
            return Err(ProjectValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ProjectDescription> for String {
    fn from(value: ProjectDescription) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProjectDescription {
    type Error = ProjectValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional trip dates; when both ends are present the end is not earlier
/// than the start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripDates {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl TripDates {
    /// Validate a date pair.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use tripboard::domain::TripDates;
    ///
    /// let start = NaiveDate::from_ymd_opt(2026, 4, 1);
    /// let end = NaiveDate::from_ymd_opt(2026, 3, 31);
    /// assert!(TripDates::new(start, end).is_err());
    /// assert!(TripDates::new(start, None).is_ok());
    /// ```
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, ProjectValidationError> {
        if let (Some(start), Some(end)) = (start, end)
            && end < start
        {
            return Err(ProjectValidationError::EndBeforeStart);
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub const fn end(&self) -> Option<NaiveDate> {
        self.end
    }
}

/// Project metadata together with its target regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub owner_id: UserId,
    pub title: ProjectTitle,
    pub description: Option<ProjectDescription>,
    pub dates: TripDates,
    pub prefectures: Vec<Prefecture>,
    pub updated_at: DateTime<Utc>,
}

/// A project as listed for one of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListing {
    pub project: Project,
    pub role: ProjectRole,
}

/// A member row joined with the member's public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMember {
    pub project_id: ProjectId,
    pub user: UserSummary,
    pub role: ProjectRole,
    pub status: MemberStatus,
}

/// Someone to bring into a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invitee {
    /// An accepted friend, added straight away as an active editor.
    Friend(UserId),
    /// Anyone else, reached through an email invite.
    Email(Email),
}

/// Everything needed to write a new project in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub id: ProjectId,
    pub owner_id: UserId,
    pub title: ProjectTitle,
    pub description: Option<ProjectDescription>,
    pub dates: TripDates,
    pub prefectures: Vec<Prefecture>,
    /// Friends added as active editors.
    pub editors: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub owner_id: UserId,
    pub title: ProjectTitle,
    pub description: Option<ProjectDescription>,
    pub dates: TripDates,
    pub prefectures: Vec<Prefecture>,
    pub invitees: Vec<Invitee>,
}

/// Partial metadata update; `None` leaves a field untouched, and the inner
/// `None` of a nested option clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetaPatch {
    pub title: Option<ProjectTitle>,
    pub description: Option<Option<ProjectDescription>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
}

impl ProjectMetaPatch {
    /// Apply the patch to current dates, revalidating the resulting range.
    pub fn merged_dates(&self, current: TripDates) -> Result<TripDates, ProjectValidationError> {
        let start = self.start_date.unwrap_or(current.start());
        let end = self.end_date.unwrap_or(current.end());
        TripDates::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn roles_are_ordered_by_privilege() {
        assert!(ProjectRole::Viewer < ProjectRole::Editor);
        assert!(ProjectRole::Editor < ProjectRole::Owner);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_titles_are_rejected(#[case] raw: &str) {
        assert_eq!(
            ProjectTitle::new(raw),
            Err(ProjectValidationError::TitleLength { max: TITLE_MAX })
        );
    }

    #[rstest]
    fn title_is_trimmed() {
        assert_eq!(ProjectTitle::new("  Kyoto ").expect("title").as_str(), "Kyoto");
    }

    #[rstest]
    fn patch_revalidates_merged_dates() {
        let current = TripDates::new(
            NaiveDate::from_ymd_opt(2026, 5, 1),
            NaiveDate::from_ymd_opt(2026, 5, 3),
        )
        .expect("dates");
        let patch = ProjectMetaPatch {
            start_date: Some(NaiveDate::from_ymd_opt(2026, 5, 10)),
            ..ProjectMetaPatch::default()
        };
        assert_eq!(
            patch.merged_dates(current),
            Err(ProjectValidationError::EndBeforeStart)
        );

        let clearing = ProjectMetaPatch {
            end_date: Some(None),
            start_date: Some(NaiveDate::from_ymd_opt(2026, 5, 10)),
            ..ProjectMetaPatch::default()
        };
        let merged = clearing.merged_dates(current).expect("open ended");
        assert_eq!(merged.end(), None);
    }

    #[rstest]
    fn unknown_member_status_never_reads_as_active() {
        assert_eq!(MemberStatus::from_storage("active"), MemberStatus::Active);
        assert_eq!(MemberStatus::from_storage("banned"), MemberStatus::Invited);
    }
}
