//! Persistence collaborators.
//!
//! The services only see these traits. Implementations must enforce the uniqueness
//! invariants atomically at write time:
//! - `(owner_id, name)` for categories, compared case-insensitively
//! - `(category_id, shared_with_user_id)` for shares
//! - email for users
//!
//! and report violations as `CategoryNameExists`, `ShareAlreadyExists` and
//! `UserEmailExists`. Soft-deleted todos are never returned by any read.
//!
//! Every call checks its [`OpContext`] before touching data.

use crate::context::OpContext;
use crate::error::Result;
use crate::grouped::GroupedRow;
use crate::model::{
    Category, CategoryId, CategoryShare, NewTask, Permission, ShareWithUser,
    SharedCategory, Task, TaskId, User, UserId,
};

/// Resolves user identity. Emails are matched case-insensitively.
pub trait UserDirectory: Send + Sync {
    fn add_user(&self, ctx: &OpContext, email: &str, name: &str) -> Result<User>;
    fn user_by_email(&self, ctx: &OpContext, email: &str) -> Result<Option<User>>;
    fn user_by_id(&self, ctx: &OpContext, id: UserId) -> Result<Option<User>>;
    fn list_users(&self, ctx: &OpContext) -> Result<Vec<User>>;
    fn rename_user(&self, ctx: &OpContext, id: UserId, name: &str) -> Result<User>;
}

pub trait CategoryStore: Send + Sync {
    fn create_category(&self, ctx: &OpContext, owner_id: UserId, name: &str) -> Result<Category>;
    fn category_by_id(&self, ctx: &OpContext, id: CategoryId) -> Result<Option<Category>>;
    fn category_by_name(
        &self,
        ctx: &OpContext,
        owner_id: UserId,
        name: &str,
    ) -> Result<Option<Category>>;
    /// Categories owned by `owner_id`, sorted by name.
    fn categories_by_owner(&self, ctx: &OpContext, owner_id: UserId) -> Result<Vec<Category>>;
    fn rename_category(&self, ctx: &OpContext, id: CategoryId, name: &str) -> Result<Category>;
    /// Removes the category together with its shares and todos.
    fn delete_category(&self, ctx: &OpContext, id: CategoryId) -> Result<()>;
}

pub trait ShareRegistry: Send + Sync {
    fn create_share(
        &self,
        ctx: &OpContext,
        category_id: CategoryId,
        user_id: UserId,
        permission: Permission,
    ) -> Result<CategoryShare>;
    fn share_for(
        &self,
        ctx: &OpContext,
        category_id: CategoryId,
        user_id: UserId,
    ) -> Result<Option<CategoryShare>>;
    fn shares_for_category(
        &self,
        ctx: &OpContext,
        category_id: CategoryId,
    ) -> Result<Vec<ShareWithUser>>;
    /// Categories shared with `user_id`, sorted by name.
    fn shared_categories_for_user(
        &self,
        ctx: &OpContext,
        user_id: UserId,
    ) -> Result<Vec<SharedCategory>>;
    /// Changes the permission in place; id and `created_at` are kept. A grant that is gone
    /// by the time the write lands is `ShareNotFound`.
    fn update_share_permission(
        &self,
        ctx: &OpContext,
        category_id: CategoryId,
        user_id: UserId,
        permission: Permission,
    ) -> Result<CategoryShare>;
    /// Returns false when no grant existed.
    fn delete_share(&self, ctx: &OpContext, category_id: CategoryId, user_id: UserId)
        -> Result<bool>;
    /// The wide read behind the grouped view: owned and shared categories sorted by name,
    /// their live todos newest first, one placeholder row per empty category.
    fn grouped_rows(&self, ctx: &OpContext, user_id: UserId) -> Result<Vec<GroupedRow>>;
}

pub trait TaskStore: Send + Sync {
    fn create_task(&self, ctx: &OpContext, task: NewTask) -> Result<Task>;
    fn task_by_id(&self, ctx: &OpContext, id: TaskId) -> Result<Option<Task>>;
    /// Persists title, description, completed, category and owner of a live todo.
    fn update_task(&self, ctx: &OpContext, task: &Task) -> Result<Task>;
    /// Returns false when the todo was missing or already deleted.
    fn soft_delete_task(&self, ctx: &OpContext, id: TaskId) -> Result<bool>;
    /// Todos owned by or shared with `user_id`, newest first, ties by id descending.
    fn accessible_tasks(
        &self,
        ctx: &OpContext,
        user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Task>, u64)>;
    fn category_tasks(
        &self,
        ctx: &OpContext,
        category_id: CategoryId,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Task>, u64)>;
}

/// Everything the services need from persistence.
pub trait Backend: UserDirectory + CategoryStore + ShareRegistry + TaskStore {}

impl<T> Backend for T where T: UserDirectory + CategoryStore + ShareRegistry + TaskStore + ?Sized {}

/// Implements every store trait for a type exposing
/// `read(ctx, op, |db| ..)` and `write(ctx, op, |db| ..)`.
macro_rules! impl_backend_via_database {
    ($store:ty) => {
        impl $crate::store::UserDirectory for $store {
            fn add_user(
                &self,
                ctx: &$crate::context::OpContext,
                email: &str,
                name: &str,
            ) -> $crate::error::Result<$crate::model::User> {
                self.write(ctx, "add user", |db| db.add_user(email, name))
            }

            fn user_by_email(
                &self,
                ctx: &$crate::context::OpContext,
                email: &str,
            ) -> $crate::error::Result<Option<$crate::model::User>> {
                self.read(ctx, "get user by email", |db| Ok(db.user_by_email(email).cloned()))
            }

            fn user_by_id(
                &self,
                ctx: &$crate::context::OpContext,
                id: $crate::model::UserId,
            ) -> $crate::error::Result<Option<$crate::model::User>> {
                self.read(ctx, "get user", |db| Ok(db.user_by_id(id).cloned()))
            }

            fn list_users(
                &self,
                ctx: &$crate::context::OpContext,
            ) -> $crate::error::Result<Vec<$crate::model::User>> {
                self.read(ctx, "list users", |db| Ok(db.users()))
            }

            fn rename_user(
                &self,
                ctx: &$crate::context::OpContext,
                id: $crate::model::UserId,
                name: &str,
            ) -> $crate::error::Result<$crate::model::User> {
                self.write(ctx, "rename user", |db| db.rename_user(id, name))
            }
        }

        impl $crate::store::CategoryStore for $store {
            fn create_category(
                &self,
                ctx: &$crate::context::OpContext,
                owner_id: $crate::model::UserId,
                name: &str,
            ) -> $crate::error::Result<$crate::model::Category> {
                self.write(ctx, "create category", |db| db.create_category(owner_id, name))
            }

            fn category_by_id(
                &self,
                ctx: &$crate::context::OpContext,
                id: $crate::model::CategoryId,
            ) -> $crate::error::Result<Option<$crate::model::Category>> {
                self.read(ctx, "get category", |db| Ok(db.category_by_id(id).cloned()))
            }

            fn category_by_name(
                &self,
                ctx: &$crate::context::OpContext,
                owner_id: $crate::model::UserId,
                name: &str,
            ) -> $crate::error::Result<Option<$crate::model::Category>> {
                self.read(ctx, "get category by name", |db| {
                    Ok(db.category_by_name(owner_id, name).cloned())
                })
            }

            fn categories_by_owner(
                &self,
                ctx: &$crate::context::OpContext,
                owner_id: $crate::model::UserId,
            ) -> $crate::error::Result<Vec<$crate::model::Category>> {
                self.read(ctx, "list categories", |db| Ok(db.categories_by_owner(owner_id)))
            }

            fn rename_category(
                &self,
                ctx: &$crate::context::OpContext,
                id: $crate::model::CategoryId,
                name: &str,
            ) -> $crate::error::Result<$crate::model::Category> {
                self.write(ctx, "rename category", |db| db.rename_category(id, name))
            }

            fn delete_category(
                &self,
                ctx: &$crate::context::OpContext,
                id: $crate::model::CategoryId,
            ) -> $crate::error::Result<()> {
                self.write(ctx, "delete category", |db| db.delete_category(id))
            }
        }

        impl $crate::store::ShareRegistry for $store {
            fn create_share(
                &self,
                ctx: &$crate::context::OpContext,
                category_id: $crate::model::CategoryId,
                user_id: $crate::model::UserId,
                permission: $crate::model::Permission,
            ) -> $crate::error::Result<$crate::model::CategoryShare> {
                self.write(ctx, "create share", |db| {
                    db.create_share(category_id, user_id, permission)
                })
            }

            fn share_for(
                &self,
                ctx: &$crate::context::OpContext,
                category_id: $crate::model::CategoryId,
                user_id: $crate::model::UserId,
            ) -> $crate::error::Result<Option<$crate::model::CategoryShare>> {
                self.read(ctx, "get share", |db| {
                    Ok(db.share_for(category_id, user_id).cloned())
                })
            }

            fn shares_for_category(
                &self,
                ctx: &$crate::context::OpContext,
                category_id: $crate::model::CategoryId,
            ) -> $crate::error::Result<Vec<$crate::model::ShareWithUser>> {
                self.read(ctx, "list shares", |db| Ok(db.shares_for_category(category_id)))
            }

            fn shared_categories_for_user(
                &self,
                ctx: &$crate::context::OpContext,
                user_id: $crate::model::UserId,
            ) -> $crate::error::Result<Vec<$crate::model::SharedCategory>> {
                self.read(ctx, "list shared categories", |db| {
                    Ok(db.shared_categories_for_user(user_id))
                })
            }

            fn update_share_permission(
                &self,
                ctx: &$crate::context::OpContext,
                category_id: $crate::model::CategoryId,
                user_id: $crate::model::UserId,
                permission: $crate::model::Permission,
            ) -> $crate::error::Result<$crate::model::CategoryShare> {
                self.write(ctx, "update share permission", |db| {
                    db.update_share_permission(category_id, user_id, permission)
                })
            }

            fn delete_share(
                &self,
                ctx: &$crate::context::OpContext,
                category_id: $crate::model::CategoryId,
                user_id: $crate::model::UserId,
            ) -> $crate::error::Result<bool> {
                self.write(ctx, "delete share", |db| Ok(db.delete_share(category_id, user_id)))
            }

            fn grouped_rows(
                &self,
                ctx: &$crate::context::OpContext,
                user_id: $crate::model::UserId,
            ) -> $crate::error::Result<Vec<$crate::grouped::GroupedRow>> {
                self.read(ctx, "grouped rows", |db| Ok(db.grouped_rows(user_id)))
            }
        }

        impl $crate::store::TaskStore for $store {
            fn create_task(
                &self,
                ctx: &$crate::context::OpContext,
                task: $crate::model::NewTask,
            ) -> $crate::error::Result<$crate::model::Task> {
                self.write(ctx, "create todo", |db| db.create_task(task))
            }

            fn task_by_id(
                &self,
                ctx: &$crate::context::OpContext,
                id: $crate::model::TaskId,
            ) -> $crate::error::Result<Option<$crate::model::Task>> {
                self.read(ctx, "get todo", |db| Ok(db.task_by_id(id).cloned()))
            }

            fn update_task(
                &self,
                ctx: &$crate::context::OpContext,
                task: &$crate::model::Task,
            ) -> $crate::error::Result<$crate::model::Task> {
                self.write(ctx, "update todo", |db| db.update_task(task))
            }

            fn soft_delete_task(
                &self,
                ctx: &$crate::context::OpContext,
                id: $crate::model::TaskId,
            ) -> $crate::error::Result<bool> {
                self.write(ctx, "delete todo", |db| Ok(db.soft_delete_task(id)))
            }

            fn accessible_tasks(
                &self,
                ctx: &$crate::context::OpContext,
                user_id: $crate::model::UserId,
                offset: u64,
                limit: u64,
            ) -> $crate::error::Result<(Vec<$crate::model::Task>, u64)> {
                self.read(ctx, "list todos", |db| {
                    Ok(db.accessible_tasks(user_id, offset, limit))
                })
            }

            fn category_tasks(
                &self,
                ctx: &$crate::context::OpContext,
                category_id: $crate::model::CategoryId,
                offset: u64,
                limit: u64,
            ) -> $crate::error::Result<(Vec<$crate::model::Task>, u64)> {
                self.read(ctx, "list category todos", |db| {
                    Ok(db.category_tasks(category_id, offset, limit))
                })
            }
        }
    };
}

pub(crate) use impl_backend_via_database;

mod database;
mod file;
mod memory;

pub use database::Database;
pub use file::FileStore;
pub use memory::MemoryStore;
