//! Grouped (category -> todos) view.
//!
//! The store returns one flat row per todo, or a single placeholder row for an accessible
//! category without todos. Rows arrive sorted by category name then todo recency; the builder
//! keeps the first-seen category order and never re-sorts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{CategoryId, Permission, PermissionLevel, TaskId, UserId};

/// One row of the wide accessible-categories read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedRow {
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_owner_id: UserId,
    pub category_owner_name: String,
    /// Grant held by the requesting user; `None` for categories they own.
    pub share_permission: Option<Permission>,
    /// `None` marks a category with no todos.
    pub task: Option<GroupedTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedTask {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_by: UserId,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub id: CategoryId,
    pub name: String,
    pub owner_id: UserId,
    pub owner_name: String,
    pub user_permission: PermissionLevel,
    pub tasks: Vec<GroupedTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct GroupedView {
    pub categories: Vec<CategoryGroup>,
}

/// Fold flat rows into groups, preserving first-seen category order.
pub fn build_grouped_view(user_id: UserId, rows: &[GroupedRow]) -> Result<GroupedView> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut slots: HashMap<CategoryId, usize> = HashMap::new();

    for row in rows {
        let slot = match slots.get(&row.category_id) {
            Some(&slot) => slot,
            None => {
                groups.push(CategoryGroup {
                    id: row.category_id,
                    name: row.category_name.clone(),
                    owner_id: row.category_owner_id,
                    owner_name: row.category_owner_name.clone(),
                    user_permission: permission_for_row(user_id, row)?,
                    tasks: Vec::new(),
                });
                let slot = groups.len() - 1;
                slots.insert(row.category_id, slot);
                slot
            }
        };

        if let Some(task) = &row.task {
            groups[slot].tasks.push(task.clone());
        }
    }

    Ok(GroupedView { categories: groups })
}

fn permission_for_row(user_id: UserId, row: &GroupedRow) -> Result<PermissionLevel> {
    if row.category_owner_id == user_id {
        return Ok(PermissionLevel::Owner);
    }
    row.share_permission
        .map(PermissionLevel::from)
        .ok_or_else(|| {
            Error::DataIntegrity(format!(
                "category {} listed for user {} without a grant",
                row.category_id, user_id
            ))
        })
}
