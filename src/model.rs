//! Records shared by the stores and services.
//!
//! Ids are assigned by the store, start at 1 and are never reused.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type UserId = u64;
pub type CategoryId = u64;
pub type ShareId = u64;
pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Access granted to a non-owner. Only `read` and `write` can be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            _ => Err(Error::InvalidArgument(format!(
                "invalid permission '{}': must be read or write",
                s
            ))),
        }
    }
}

/// Effective access of a user to a category.
///
/// Variants are declared weakest first so the derived ordering is the dominance order:
/// `None < Read < Write < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    None,
    Read,
    Write,
    Owner,
}

impl PermissionLevel {
    /// True when this level dominates (or equals) `required`.
    pub fn allows(self, required: PermissionLevel) -> bool {
        self >= required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::None => "none",
            PermissionLevel::Read => "read",
            PermissionLevel::Write => "write",
            PermissionLevel::Owner => "owner",
        }
    }
}

impl From<Permission> for PermissionLevel {
    fn from(permission: Permission) -> Self {
        match permission {
            Permission::Read => PermissionLevel::Read,
            Permission::Write => PermissionLevel::Write,
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub id: ShareId,
    pub category_id: CategoryId,
    pub shared_with_user_id: UserId,
    pub permission: Permission,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub completed: bool,
    /// Always the owner of `category_id`.
    pub owner_user_id: UserId,
    pub created_by_user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Fields for a task insert; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category_id: CategoryId,
    pub owner_user_id: UserId,
    pub created_by_user_id: UserId,
}

/// A share with enough target-user metadata to render without another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareWithUser {
    #[serde(flatten)]
    pub share: CategoryShare,
    pub shared_with_user_name: String,
    pub shared_with_user_email: String,
}

/// A category shared with the requesting user, with owner metadata attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedCategory {
    #[serde(flatten)]
    pub category: Category,
    pub permission: Permission,
    pub owner_name: String,
    pub owner_email: String,
}

/// One page of tasks plus the totals needed to render pagination.
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}
