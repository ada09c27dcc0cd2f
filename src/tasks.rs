//! Todo lifecycle under category permissions.
//!
//! A todo is `active` until it is soft-deleted; there is no way back. Its `owner_user_id`
//! always follows the owner of its current category, while `created_by_user_id` never changes.
//!
//! Operations addressed by todo id hide the existence of todos the caller cannot see: a
//! category with no grant for the caller surfaces as `TaskNotFound`, not `Forbidden`.

use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::context::OpContext;
use crate::error::{Error, Result, ResultExt};
use crate::grouped::{build_grouped_view, GroupedView};
use crate::model::{Category, CategoryId, NewTask, PermissionLevel, Task, TaskId, TaskPage, UserId};
use crate::permission::PermissionResolver;
use crate::store::{Backend, CategoryStore, ShareRegistry, TaskStore};

/// Where a new todo goes: an existing category id, or a name to get-or-create for the caller.
///
/// When both are given the id wins; an id of zero counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: Option<CategoryId>,
    pub name: Option<String>,
}

impl CategoryRef {
    pub fn id(id: CategoryId) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

enum ResolvedRef<'a> {
    Id(CategoryId),
    Name(&'a str),
}

impl CategoryRef {
    fn resolve(&self) -> Result<ResolvedRef<'_>> {
        if let Some(id) = self.id.filter(|id| *id > 0) {
            return Ok(ResolvedRef::Id(id));
        }
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(ResolvedRef::Name(name)),
            _ => Err(Error::CategoryRequired),
        }
    }
}

/// Partial update; only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<CategoryId>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.category_id.is_none()
    }

    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::NoChanges);
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidArgument("title cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

fn hide_unseen(err: Error, task_id: TaskId) -> Error {
    match err {
        Error::Forbidden(_) | Error::CategoryNotFound(_) => Error::TaskNotFound(task_id),
        other => other,
    }
}

pub struct TaskService {
    store: Arc<dyn Backend>,
    pagination: PaginationConfig,
}

impl TaskService {
    pub fn new(store: Arc<dyn Backend>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    fn resolver(&self) -> PermissionResolver<'_, dyn Backend> {
        PermissionResolver::new(self.store.as_ref())
    }

    fn fetch(&self, ctx: &OpContext, task_id: TaskId, operation: &'static str) -> Result<Task> {
        self.store
            .task_by_id(ctx, task_id)
            .within(operation)?
            .ok_or(Error::TaskNotFound(task_id))
    }

    /// Create a todo for `user_id`.
    ///
    /// An explicit category needs write access; a name is looked up among the caller's own
    /// categories and created when missing.
    pub fn create(
        &self,
        ctx: &OpContext,
        user_id: UserId,
        title: &str,
        description: &str,
        category: &CategoryRef,
    ) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArgument("title cannot be empty".to_string()));
        }

        let category = match category.resolve()? {
            ResolvedRef::Id(id) => self
                .resolver()
                .require(ctx, user_id, id, PermissionLevel::Write)
                .within("create todo")?,
            ResolvedRef::Name(name) => self.get_or_create_category(ctx, user_id, name)?,
        };

        let task = self
            .store
            .create_task(
                ctx,
                NewTask {
                    title: title.to_string(),
                    description: description.to_string(),
                    category_id: category.id,
                    owner_user_id: category.owner_id,
                    created_by_user_id: user_id,
                },
            )
            .within("create todo")?;
        tracing::info!(task_id = task.id, category_id = category.id, user_id, "todo created");
        Ok(task)
    }

    fn get_or_create_category(
        &self,
        ctx: &OpContext,
        owner_id: UserId,
        name: &str,
    ) -> Result<Category> {
        if let Some(existing) = self
            .store
            .category_by_name(ctx, owner_id, name)
            .within("resolve category")?
        {
            return Ok(existing);
        }

        match self.store.create_category(ctx, owner_id, name) {
            Ok(created) => {
                tracing::info!(category_id = created.id, owner_id, name, "category created for todo");
                Ok(created)
            }
            // Lost a race with a concurrent create of the same name.
            Err(Error::CategoryNameExists(_)) => self
                .store
                .category_by_name(ctx, owner_id, name)
                .within("resolve category")?
                .ok_or_else(|| Error::CategoryNameExists(name.to_string())),
            Err(err) => Err(err.within("resolve category")),
        }
    }

    /// Fetch a live todo the caller can at least read.
    pub fn get(&self, ctx: &OpContext, user_id: UserId, task_id: TaskId) -> Result<Task> {
        let task = self.fetch(ctx, task_id, "get todo")?;
        self.resolver()
            .require(ctx, user_id, task.category_id, PermissionLevel::Read)
            .within("get todo")
            .map_err(|err| hide_unseen(err, task_id))?;
        Ok(task)
    }

    /// Apply a partial update.
    ///
    /// Needs write on the current category and, when the todo moves, write on the target
    /// category as well. A move hands ownership to the target category's owner.
    pub fn update(
        &self,
        ctx: &OpContext,
        user_id: UserId,
        task_id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Task> {
        patch.validate()?;

        let mut task = self.fetch(ctx, task_id, "update todo")?;
        self.resolver()
            .require(ctx, user_id, task.category_id, PermissionLevel::Write)
            .within("update todo")
            .map_err(|err| hide_unseen(err, task_id))?;

        let move_to = patch.category_id.filter(|id| *id != task.category_id);
        if move_to.is_none()
            && patch.title.is_none()
            && patch.description.is_none()
            && patch.completed.is_none()
        {
            return Err(Error::NoChanges);
        }

        if let Some(target_id) = move_to {
            let target = self
                .resolver()
                .require(ctx, user_id, target_id, PermissionLevel::Write)
                .within("update todo")?;
            tracing::info!(
                task_id,
                from = task.category_id,
                to = target.id,
                new_owner = target.owner_id,
                "todo moved"
            );
            task.category_id = target.id;
            task.owner_user_id = target.owner_id;
        }

        if let Some(title) = &patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }

        self.store.update_task(ctx, &task).within("update todo")
    }

    /// Soft-delete a todo; later reads report it as not found.
    pub fn delete(&self, ctx: &OpContext, user_id: UserId, task_id: TaskId) -> Result<()> {
        let task = self.fetch(ctx, task_id, "delete todo")?;
        self.resolver()
            .require(ctx, user_id, task.category_id, PermissionLevel::Write)
            .within("delete todo")
            .map_err(|err| hide_unseen(err, task_id))?;

        if !self
            .store
            .soft_delete_task(ctx, task_id)
            .within("delete todo")?
        {
            return Err(Error::TaskNotFound(task_id));
        }
        tracing::info!(task_id, user_id, "todo deleted");
        Ok(())
    }

    /// Todos owned by the caller or living in a category shared with them, newest first.
    pub fn list(&self, ctx: &OpContext, user_id: UserId, page: i64, page_size: i64) -> Result<TaskPage> {
        let (page, page_size) = self.pagination.normalize(page, page_size);
        let offset = (page - 1).saturating_mul(page_size);
        let (tasks, total) = self
            .store
            .accessible_tasks(ctx, user_id, offset, page_size)
            .within("list todos")?;
        Ok(TaskPage {
            tasks,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
        })
    }

    /// Every accessible category with its live todos, in category-name order.
    pub fn grouped_view(&self, ctx: &OpContext, user_id: UserId) -> Result<GroupedView> {
        let rows = self
            .store
            .grouped_rows(ctx, user_id)
            .within("grouped view")?;
        build_grouped_view(user_id, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Permission, User};
    use crate::store::{MemoryStore, UserDirectory};

    struct Fixture {
        store: Arc<MemoryStore>,
        tasks: TaskService,
        ctx: OpContext,
        owner: User,
        guest: User,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let ctx = OpContext::background();
        let owner = store.add_user(&ctx, "owner@example.com", "Owner").unwrap();
        let guest = store.add_user(&ctx, "guest@example.com", "Guest").unwrap();
        let tasks = TaskService::new(store.clone(), PaginationConfig::default());
        Fixture {
            store,
            tasks,
            ctx,
            owner,
            guest,
        }
    }

    #[test]
    fn create_by_name_reuses_existing_category() {
        let f = fixture();
        let first = f
            .tasks
            .create(&f.ctx, f.owner.id, "A", "", &CategoryRef::name("Work"))
            .unwrap();
        let second = f
            .tasks
            .create(&f.ctx, f.owner.id, "B", "", &CategoryRef::name(" work "))
            .unwrap();
        assert_eq!(first.category_id, second.category_id);
        assert_eq!(first.owner_user_id, f.owner.id);
        assert_eq!(first.created_by_user_id, f.owner.id);
    }

    #[test]
    fn create_requires_some_category() {
        let f = fixture();
        let blank = CategoryRef {
            id: Some(0),
            name: Some("   ".to_string()),
        };
        for reference in [CategoryRef::default(), blank] {
            let err = f
                .tasks
                .create(&f.ctx, f.owner.id, "A", "", &reference)
                .expect_err("no category");
            assert!(matches!(err, Error::CategoryRequired));
        }
    }

    #[test]
    fn id_takes_precedence_over_name() {
        let f = fixture();
        let work = f.store.create_category(&f.ctx, f.owner.id, "Work").unwrap();
        let reference = CategoryRef {
            id: Some(work.id),
            name: Some("Other".to_string()),
        };
        let task = f
            .tasks
            .create(&f.ctx, f.owner.id, "A", "", &reference)
            .unwrap();
        assert_eq!(task.category_id, work.id);
        assert!(f
            .store
            .category_by_name(&f.ctx, f.owner.id, "Other")
            .unwrap()
            .is_none());
    }

    #[test]
    fn create_into_shared_category_needs_write() {
        let f = fixture();
        let work = f.store.create_category(&f.ctx, f.owner.id, "Work").unwrap();

        let err = f
            .tasks
            .create(&f.ctx, f.guest.id, "A", "", &CategoryRef::id(work.id))
            .expect_err("no grant");
        assert!(matches!(err, Error::Forbidden(_)));

        f.store
            .create_share(&f.ctx, work.id, f.guest.id, Permission::Read)
            .unwrap();
        let err = f
            .tasks
            .create(&f.ctx, f.guest.id, "A", "", &CategoryRef::id(work.id))
            .expect_err("read only");
        assert!(matches!(err, Error::NoWritePermission(_)));

        f.store
            .update_share_permission(&f.ctx, work.id, f.guest.id, Permission::Write)
            .unwrap();
        let task = f
            .tasks
            .create(&f.ctx, f.guest.id, "A", "", &CategoryRef::id(work.id))
            .unwrap();
        assert_eq!(task.owner_user_id, f.owner.id);
        assert_eq!(task.created_by_user_id, f.guest.id);
    }

    #[test]
    fn update_validates_patch_before_lookup() {
        let f = fixture();
        assert!(matches!(
            f.tasks.update(&f.ctx, f.owner.id, 99, &TaskPatch::default()),
            Err(Error::NoChanges)
        ));
        let blank_title = TaskPatch {
            title: Some("  ".to_string()),
            ..TaskPatch::default()
        };
        assert!(matches!(
            f.tasks.update(&f.ctx, f.owner.id, 99, &blank_title),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn move_to_current_category_alone_is_no_change() {
        let f = fixture();
        let task = f
            .tasks
            .create(&f.ctx, f.owner.id, "A", "", &CategoryRef::name("Work"))
            .unwrap();
        let same_place = TaskPatch {
            category_id: Some(task.category_id),
            ..TaskPatch::default()
        };
        assert!(matches!(
            f.tasks.update(&f.ctx, f.owner.id, task.id, &same_place),
            Err(Error::NoChanges)
        ));
        let unchanged = f.tasks.get(&f.ctx, f.owner.id, task.id).unwrap();
        assert_eq!(unchanged.updated_at, task.updated_at);

        // Without access the todo stays hidden rather than reporting the empty patch.
        assert!(matches!(
            f.tasks.update(&f.ctx, f.guest.id, task.id, &same_place),
            Err(Error::TaskNotFound(_))
        ));

        let with_title = TaskPatch {
            title: Some("B".to_string()),
            category_id: Some(task.category_id),
            ..TaskPatch::default()
        };
        let renamed = f.tasks.update(&f.ctx, f.owner.id, task.id, &with_title).unwrap();
        assert_eq!(renamed.title, "B");
        assert_eq!(renamed.category_id, task.category_id);
    }

    #[test]
    fn move_transfers_ownership_and_keeps_creator() {
        let f = fixture();
        let task = f
            .tasks
            .create(&f.ctx, f.owner.id, "A", "", &CategoryRef::name("Mine"))
            .unwrap();
        let theirs = f.store.create_category(&f.ctx, f.guest.id, "Theirs").unwrap();
        f.store
            .create_share(&f.ctx, theirs.id, f.owner.id, Permission::Write)
            .unwrap();

        let moved = f
            .tasks
            .update(
                &f.ctx,
                f.owner.id,
                task.id,
                &TaskPatch {
                    category_id: Some(theirs.id),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(moved.category_id, theirs.id);
        assert_eq!(moved.owner_user_id, f.guest.id);
        assert_eq!(moved.created_by_user_id, f.owner.id);
    }

    #[test]
    fn move_into_unwritable_category_leaves_todo_alone() {
        let f = fixture();
        let task = f
            .tasks
            .create(&f.ctx, f.owner.id, "A", "", &CategoryRef::name("Mine"))
            .unwrap();
        let theirs = f.store.create_category(&f.ctx, f.guest.id, "Theirs").unwrap();
        f.store
            .create_share(&f.ctx, theirs.id, f.owner.id, Permission::Read)
            .unwrap();

        let patch = TaskPatch {
            title: Some("renamed".to_string()),
            category_id: Some(theirs.id),
            ..TaskPatch::default()
        };
        let err = f
            .tasks
            .update(&f.ctx, f.owner.id, task.id, &patch)
            .expect_err("target is read only");
        assert!(matches!(err, Error::NoWritePermission(id) if id == theirs.id));

        let unchanged = f.tasks.get(&f.ctx, f.owner.id, task.id).unwrap();
        assert_eq!(unchanged.title, "A");
        assert_eq!(unchanged.category_id, task.category_id);
    }

    #[test]
    fn stranger_sees_not_found() {
        let f = fixture();
        let task = f
            .tasks
            .create(&f.ctx, f.owner.id, "A", "", &CategoryRef::name("Mine"))
            .unwrap();
        let patch = TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        };

        assert!(matches!(
            f.tasks.get(&f.ctx, f.guest.id, task.id),
            Err(Error::TaskNotFound(_))
        ));
        assert!(matches!(
            f.tasks.update(&f.ctx, f.guest.id, task.id, &patch),
            Err(Error::TaskNotFound(_))
        ));
        assert!(matches!(
            f.tasks.delete(&f.ctx, f.guest.id, task.id),
            Err(Error::TaskNotFound(_))
        ));
    }

    #[test]
    fn deleted_todo_disappears_everywhere() {
        let f = fixture();
        let task = f
            .tasks
            .create(&f.ctx, f.owner.id, "A", "", &CategoryRef::name("Mine"))
            .unwrap();
        f.tasks.delete(&f.ctx, f.owner.id, task.id).unwrap();

        assert!(matches!(
            f.tasks.get(&f.ctx, f.owner.id, task.id),
            Err(Error::TaskNotFound(_))
        ));
        assert_eq!(f.tasks.list(&f.ctx, f.owner.id, 1, 10).unwrap().total, 0);
        let view = f.tasks.grouped_view(&f.ctx, f.owner.id).unwrap();
        assert!(view.categories[0].tasks.is_empty());
        assert!(matches!(
            f.tasks.delete(&f.ctx, f.owner.id, task.id),
            Err(Error::TaskNotFound(_))
        ));
    }

    #[test]
    fn list_normalizes_paging() {
        let f = fixture();
        for n in 0..12 {
            f.tasks
                .create(&f.ctx, f.owner.id, &format!("t{n}"), "", &CategoryRef::name("Mine"))
                .unwrap();
        }

        let page = f.tasks.list(&f.ctx, f.owner.id, -5, 0).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.tasks.len(), 10);
        assert_eq!(page.tasks[0].title, "t11");

        let second = f.tasks.list(&f.ctx, f.owner.id, 2, 10).unwrap();
        assert_eq!(second.tasks.len(), 2);
        assert_eq!(second.tasks[1].title, "t0");
    }

    #[test]
    fn cancelled_context_is_timeout() {
        let f = fixture();
        let ctx = OpContext::background();
        ctx.cancel_handle().cancel();
        let err = f
            .tasks
            .create(&ctx, f.owner.id, "A", "", &CategoryRef::name("Mine"))
            .expect_err("cancelled");
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
