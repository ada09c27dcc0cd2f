//! In-memory record set shared by the memory and file stores.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grouped::{GroupedRow, GroupedTask};
use crate::model::{
    Category, CategoryId, CategoryShare, NewTask, Permission, ShareWithUser,
    SharedCategory, Task, TaskId, User, UserId,
};

const SCHEMA_VERSION: &str = "todoshare.store.v1";

fn schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IdCounters {
    user: u64,
    category: u64,
    share: u64,
    task: u64,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn same_name(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Newest first, ties broken by id descending.
fn sort_by_recency(tasks: &mut [&Task]) {
    tasks.sort_by(|left, right| {
        right
            .created_at
            .cmp(&left.created_at)
            .then_with(|| right.id.cmp(&left.id))
    });
}

fn page_of(tasks: Vec<&Task>, offset: u64, limit: u64) -> (Vec<Task>, u64) {
    let total = tasks.len() as u64;
    let page = tasks
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect();
    (page, total)
}

/// All users, categories, shares and todos plus their id counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(default = "schema_version")]
    schema_version: String,
    #[serde(default)]
    next_ids: IdCounters,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    shares: Vec<CategoryShare>,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            schema_version: schema_version(),
            next_ids: IdCounters::default(),
            users: Vec::new(),
            categories: Vec::new(),
            shares: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn add_user(&mut self, email: &str, name: &str) -> Result<User> {
        let email = normalize_email(email);
        let name = name.trim();
        if email.is_empty() {
            return Err(Error::InvalidArgument("email cannot be empty".to_string()));
        }
        if name.is_empty() {
            return Err(Error::InvalidArgument("name cannot be empty".to_string()));
        }
        if self.user_by_email(&email).is_some() {
            return Err(Error::UserEmailExists(email));
        }

        let now = Utc::now();
        let user = User {
            id: next_id(&mut self.next_ids.user),
            name: name.to_string(),
            email,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        let email = normalize_email(email);
        self.users.iter().find(|user| user.email == email)
    }

    pub fn user_by_id(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn users(&self) -> Vec<User> {
        self.users.clone()
    }

    pub fn rename_user(&mut self, id: UserId, name: &str) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("name cannot be empty".to_string()));
        }
        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| Error::UserNotFound(id.to_string()))?;
        user.name = name.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    fn user_name(&self, id: UserId) -> String {
        self.user_by_id(id)
            .map(|user| user.name.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn create_category(&mut self, owner_id: UserId, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "category name cannot be empty".to_string(),
            ));
        }
        if self.user_by_id(owner_id).is_none() {
            return Err(Error::UserNotFound(owner_id.to_string()));
        }
        if self.category_by_name(owner_id, name).is_some() {
            return Err(Error::CategoryNameExists(name.to_string()));
        }

        let now = Utc::now();
        let category = Category {
            id: next_id(&mut self.next_ids.category),
            name: name.to_string(),
            owner_id,
            created_at: now,
            updated_at: now,
        };
        self.categories.push(category.clone());
        Ok(category)
    }

    pub fn category_by_id(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_by_name(&self, owner_id: UserId, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.owner_id == owner_id && same_name(&category.name, name))
    }

    pub fn categories_by_owner(&self, owner_id: UserId) -> Vec<Category> {
        let mut owned: Vec<Category> = self
            .categories
            .iter()
            .filter(|category| category.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|left, right| {
            left.name
                .to_lowercase()
                .cmp(&right.name.to_lowercase())
                .then_with(|| left.id.cmp(&right.id))
        });
        owned
    }

    pub fn rename_category(&mut self, id: CategoryId, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "category name cannot be empty".to_string(),
            ));
        }
        let owner_id = self
            .category_by_id(id)
            .map(|category| category.owner_id)
            .ok_or(Error::CategoryNotFound(id))?;
        let clash = self.categories.iter().any(|category| {
            category.id != id && category.owner_id == owner_id && same_name(&category.name, name)
        });
        if clash {
            return Err(Error::CategoryNameExists(name.to_string()));
        }

        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or(Error::CategoryNotFound(id))?;
        category.name = name.to_string();
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    pub fn delete_category(&mut self, id: CategoryId) -> Result<()> {
        let before = self.categories.len();
        self.categories.retain(|category| category.id != id);
        if self.categories.len() == before {
            return Err(Error::CategoryNotFound(id));
        }
        self.shares.retain(|share| share.category_id != id);
        self.tasks.retain(|task| task.category_id != id);
        Ok(())
    }

    // =========================================================================
    // Shares
    // =========================================================================

    pub fn create_share(
        &mut self,
        category_id: CategoryId,
        user_id: UserId,
        permission: Permission,
    ) -> Result<CategoryShare> {
        if self.category_by_id(category_id).is_none() {
            return Err(Error::CategoryNotFound(category_id));
        }
        if self.user_by_id(user_id).is_none() {
            return Err(Error::UserNotFound(user_id.to_string()));
        }
        if self.share_for(category_id, user_id).is_some() {
            return Err(Error::ShareAlreadyExists {
                category_id,
                user_id,
            });
        }

        let share = CategoryShare {
            id: next_id(&mut self.next_ids.share),
            category_id,
            shared_with_user_id: user_id,
            permission,
            created_at: Utc::now(),
        };
        self.shares.push(share.clone());
        Ok(share)
    }

    pub fn share_for(&self, category_id: CategoryId, user_id: UserId) -> Option<&CategoryShare> {
        self.shares
            .iter()
            .find(|share| share.category_id == category_id && share.shared_with_user_id == user_id)
    }

    pub fn shares_for_category(&self, category_id: CategoryId) -> Vec<ShareWithUser> {
        let mut shares: Vec<&CategoryShare> = self
            .shares
            .iter()
            .filter(|share| share.category_id == category_id)
            .collect();
        shares.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        shares
            .into_iter()
            .map(|share| {
                let user = self.user_by_id(share.shared_with_user_id);
                ShareWithUser {
                    share: share.clone(),
                    shared_with_user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    shared_with_user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
                }
            })
            .collect()
    }

    pub fn shared_categories_for_user(&self, user_id: UserId) -> Vec<SharedCategory> {
        let mut shared: Vec<SharedCategory> = self
            .shares
            .iter()
            .filter(|share| share.shared_with_user_id == user_id)
            .filter_map(|share| {
                let category = self.category_by_id(share.category_id)?;
                let owner = self.user_by_id(category.owner_id);
                Some(SharedCategory {
                    category: category.clone(),
                    permission: share.permission,
                    owner_name: owner.map(|u| u.name.clone()).unwrap_or_default(),
                    owner_email: owner.map(|u| u.email.clone()).unwrap_or_default(),
                })
            })
            .collect();
        shared.sort_by(|left, right| {
            left.category
                .name
                .to_lowercase()
                .cmp(&right.category.name.to_lowercase())
                .then_with(|| left.category.id.cmp(&right.category.id))
        });
        shared
    }

    pub fn update_share_permission(
        &mut self,
        category_id: CategoryId,
        user_id: UserId,
        permission: Permission,
    ) -> Result<CategoryShare> {
        let share = self
            .shares
            .iter_mut()
            .find(|share| share.category_id == category_id && share.shared_with_user_id == user_id)
            .ok_or(Error::ShareNotFound {
                category_id,
                user_id,
            })?;
        share.permission = permission;
        Ok(share.clone())
    }

    pub fn delete_share(&mut self, category_id: CategoryId, user_id: UserId) -> bool {
        let before = self.shares.len();
        self.shares.retain(|share| {
            !(share.category_id == category_id && share.shared_with_user_id == user_id)
        });
        self.shares.len() != before
    }

    pub fn grouped_rows(&self, user_id: UserId) -> Vec<GroupedRow> {
        let mut accessible: Vec<(&Category, Option<Permission>)> = self
            .categories
            .iter()
            .filter(|category| category.owner_id == user_id)
            .map(|category| (category, None))
            .collect();
        for share in self.shares.iter().filter(|s| s.shared_with_user_id == user_id) {
            if let Some(category) = self.category_by_id(share.category_id) {
                if category.owner_id != user_id {
                    accessible.push((category, Some(share.permission)));
                }
            }
        }
        accessible.sort_by(|(left, _), (right, _)| {
            left.name
                .to_lowercase()
                .cmp(&right.name.to_lowercase())
                .then_with(|| left.id.cmp(&right.id))
        });

        let mut rows = Vec::new();
        for (category, share_permission) in accessible {
            let owner_name = self.user_name(category.owner_id);
            let mut tasks: Vec<&Task> = self
                .tasks
                .iter()
                .filter(|task| task.category_id == category.id && !task.is_deleted())
                .collect();
            sort_by_recency(&mut tasks);

            let base = GroupedRow {
                category_id: category.id,
                category_name: category.name.clone(),
                category_owner_id: category.owner_id,
                category_owner_name: owner_name,
                share_permission,
                task: None,
            };
            if tasks.is_empty() {
                rows.push(base);
                continue;
            }
            for task in tasks {
                rows.push(GroupedRow {
                    task: Some(GroupedTask {
                        id: task.id,
                        title: task.title.clone(),
                        description: task.description.clone(),
                        completed: task.completed,
                        created_by: task.created_by_user_id,
                        creator_name: self.user_name(task.created_by_user_id),
                        created_at: task.created_at,
                        updated_at: task.updated_at,
                    }),
                    ..base.clone()
                });
            }
        }
        rows
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn create_task(&mut self, new: NewTask) -> Result<Task> {
        if self.category_by_id(new.category_id).is_none() {
            return Err(Error::CategoryNotFound(new.category_id));
        }

        let now = Utc::now();
        let task = Task {
            id: next_id(&mut self.next_ids.task),
            title: new.title,
            description: new.description,
            category_id: new.category_id,
            completed: false,
            owner_user_id: new.owner_user_id,
            created_by_user_id: new.created_by_user_id,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn task_by_id(&self, id: TaskId) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == id && !task.is_deleted())
    }

    pub fn update_task(&mut self, changed: &Task) -> Result<Task> {
        if self.category_by_id(changed.category_id).is_none() {
            return Err(Error::CategoryNotFound(changed.category_id));
        }
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == changed.id && !task.is_deleted())
            .ok_or(Error::TaskNotFound(changed.id))?;
        task.title = changed.title.clone();
        task.description = changed.description.clone();
        task.completed = changed.completed;
        task.category_id = changed.category_id;
        task.owner_user_id = changed.owner_user_id;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    pub fn soft_delete_task(&mut self, id: TaskId) -> bool {
        match self
            .tasks
            .iter_mut()
            .find(|task| task.id == id && !task.is_deleted())
        {
            Some(task) => {
                let now = Utc::now();
                task.deleted_at = Some(now);
                task.updated_at = now;
                true
            }
            None => false,
        }
    }

    pub fn accessible_tasks(&self, user_id: UserId, offset: u64, limit: u64) -> (Vec<Task>, u64) {
        let shared: HashSet<CategoryId> = self
            .shares
            .iter()
            .filter(|share| share.shared_with_user_id == user_id)
            .map(|share| share.category_id)
            .collect();
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| !task.is_deleted())
            .filter(|task| task.owner_user_id == user_id || shared.contains(&task.category_id))
            .collect();
        sort_by_recency(&mut tasks);
        page_of(tasks, offset, limit)
    }

    pub fn category_tasks(&self, category_id: CategoryId, offset: u64, limit: u64) -> (Vec<Task>, u64) {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.category_id == category_id && !task.is_deleted())
            .collect();
        sort_by_recency(&mut tasks);
        page_of(tasks, offset, limit)
    }
}
