//! Explicit category management.
//!
//! Reads hide categories the caller has no grant on (`CategoryNotFound`); management is
//! owner-only (`CategoryForbidden`).

use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::context::OpContext;
use crate::error::{Error, Result, ResultExt};
use crate::model::{Category, CategoryId, PermissionLevel, TaskPage, UserId};
use crate::permission::PermissionResolver;
use crate::store::{Backend, CategoryStore, TaskStore};

pub struct CategoryService {
    store: Arc<dyn Backend>,
    pagination: PaginationConfig,
}

impl CategoryService {
    pub fn new(store: Arc<dyn Backend>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    fn resolver(&self) -> PermissionResolver<'_, dyn Backend> {
        PermissionResolver::new(self.store.as_ref())
    }

    fn owned(&self, ctx: &OpContext, owner_id: UserId, category_id: CategoryId) -> Result<Category> {
        let (category, level) = self.resolver().resolve_with_category(ctx, owner_id, category_id)?;
        match level {
            PermissionLevel::Owner => Ok(category),
            PermissionLevel::None => Err(Error::CategoryNotFound(category_id)),
            _ => Err(Error::CategoryForbidden(category_id)),
        }
    }

    pub fn create(&self, ctx: &OpContext, owner_id: UserId, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "category name cannot be empty".to_string(),
            ));
        }
        if self
            .store
            .category_by_name(ctx, owner_id, name)
            .within("create category")?
            .is_some()
        {
            return Err(Error::CategoryNameExists(name.to_string()));
        }

        let category = self
            .store
            .create_category(ctx, owner_id, name)
            .within("create category")?;
        tracing::info!(category_id = category.id, owner_id, "category created");
        Ok(category)
    }

    /// A category the caller owns or holds any grant on.
    pub fn get(&self, ctx: &OpContext, user_id: UserId, category_id: CategoryId) -> Result<Category> {
        let (category, level) = self
            .resolver()
            .resolve_with_category(ctx, user_id, category_id)
            .within("get category")?;
        if level == PermissionLevel::None {
            return Err(Error::CategoryNotFound(category_id));
        }
        Ok(category)
    }

    pub fn rename(
        &self,
        ctx: &OpContext,
        owner_id: UserId,
        category_id: CategoryId,
        name: &str,
    ) -> Result<Category> {
        self.owned(ctx, owner_id, category_id)
            .within("rename category")?;
        self.store
            .rename_category(ctx, category_id, name)
            .within("rename category")
    }

    /// Remove a category with all of its todos and grants.
    pub fn delete(&self, ctx: &OpContext, owner_id: UserId, category_id: CategoryId) -> Result<()> {
        self.owned(ctx, owner_id, category_id)
            .within("delete category")?;
        self.store
            .delete_category(ctx, category_id)
            .within("delete category")?;
        tracing::info!(category_id, owner_id, "category deleted");
        Ok(())
    }

    /// The caller's effective level; `none` is a valid answer.
    pub fn permission(
        &self,
        ctx: &OpContext,
        user_id: UserId,
        category_id: CategoryId,
    ) -> Result<PermissionLevel> {
        self.resolver()
            .resolve(ctx, user_id, category_id)
            .within("resolve permission")
    }

    /// Live todos of one category, newest first.
    pub fn list_tasks(
        &self,
        ctx: &OpContext,
        user_id: UserId,
        category_id: CategoryId,
        page: i64,
        page_size: i64,
    ) -> Result<TaskPage> {
        self.resolver()
            .require(ctx, user_id, category_id, PermissionLevel::Read)
            .within("list category todos")
            .map_err(|err| match err {
                Error::Forbidden(id) => Error::CategoryNotFound(id),
                other => other,
            })?;

        let (page, page_size) = self.pagination.normalize(page, page_size);
        let offset = (page - 1).saturating_mul(page_size);
        let (tasks, total) = self
            .store
            .category_tasks(ctx, category_id, offset, page_size)
            .within("list category todos")?;
        Ok(TaskPage {
            tasks,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, Permission, User};
    use crate::store::{MemoryStore, ShareRegistry, UserDirectory};

    struct Fixture {
        store: Arc<MemoryStore>,
        categories: CategoryService,
        ctx: OpContext,
        owner: User,
        guest: User,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let ctx = OpContext::background();
        let owner = store.add_user(&ctx, "owner@example.com", "Owner").unwrap();
        let guest = store.add_user(&ctx, "guest@example.com", "Guest").unwrap();
        let categories = CategoryService::new(store.clone(), PaginationConfig::default());
        Fixture {
            store,
            categories,
            ctx,
            owner,
            guest,
        }
    }

    #[test]
    fn duplicate_name_conflicts() {
        let f = fixture();
        f.categories.create(&f.ctx, f.owner.id, "Work").unwrap();
        let err = f
            .categories
            .create(&f.ctx, f.owner.id, "WORK")
            .expect_err("duplicate");
        assert!(matches!(err, Error::CategoryNameExists(_)));
    }

    #[test]
    fn get_hides_unshared_categories() {
        let f = fixture();
        let work = f.categories.create(&f.ctx, f.owner.id, "Work").unwrap();
        assert!(matches!(
            f.categories.get(&f.ctx, f.guest.id, work.id),
            Err(Error::CategoryNotFound(_))
        ));

        f.store
            .create_share(&f.ctx, work.id, f.guest.id, Permission::Read)
            .unwrap();
        assert_eq!(f.categories.get(&f.ctx, f.guest.id, work.id).unwrap().id, work.id);
    }

    #[test]
    fn rename_is_owner_only_and_same_name_is_allowed() {
        let f = fixture();
        let work = f.categories.create(&f.ctx, f.owner.id, "Work").unwrap();
        f.categories.create(&f.ctx, f.owner.id, "Home").unwrap();
        f.store
            .create_share(&f.ctx, work.id, f.guest.id, Permission::Write)
            .unwrap();

        assert!(matches!(
            f.categories.rename(&f.ctx, f.guest.id, work.id, "Mine"),
            Err(Error::CategoryForbidden(_))
        ));
        assert!(matches!(
            f.categories.rename(&f.ctx, f.owner.id, work.id, "home"),
            Err(Error::CategoryNameExists(_))
        ));
        let same = f.categories.rename(&f.ctx, f.owner.id, work.id, "Work").unwrap();
        assert_eq!(same.name, "Work");
    }

    #[test]
    fn delete_cascades_to_grants_and_todos() {
        let f = fixture();
        let work = f.categories.create(&f.ctx, f.owner.id, "Work").unwrap();
        f.store
            .create_share(&f.ctx, work.id, f.guest.id, Permission::Write)
            .unwrap();
        let task = f
            .store
            .create_task(
                &f.ctx,
                NewTask {
                    title: "A".to_string(),
                    description: String::new(),
                    category_id: work.id,
                    owner_user_id: f.owner.id,
                    created_by_user_id: f.owner.id,
                },
            )
            .unwrap();

        f.categories.delete(&f.ctx, f.owner.id, work.id).unwrap();
        assert!(f.store.task_by_id(&f.ctx, task.id).unwrap().is_none());
        assert!(f.store.share_for(&f.ctx, work.id, f.guest.id).unwrap().is_none());
        assert!(matches!(
            f.categories.permission(&f.ctx, f.guest.id, work.id),
            Err(Error::CategoryNotFound(_))
        ));
    }

    #[test]
    fn list_tasks_requires_read() {
        let f = fixture();
        let work = f.categories.create(&f.ctx, f.owner.id, "Work").unwrap();
        assert!(matches!(
            f.categories.list_tasks(&f.ctx, f.guest.id, work.id, 1, 10),
            Err(Error::CategoryNotFound(_))
        ));

        f.store
            .create_share(&f.ctx, work.id, f.guest.id, Permission::Read)
            .unwrap();
        let page = f
            .categories
            .list_tasks(&f.ctx, f.guest.id, work.id, 1, 0)
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total_pages, 0);
    }
}
