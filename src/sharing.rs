//! Category sharing: creating, changing and revoking grants.
//!
//! Every operation is owner-scoped. A missing category is `CategoryNotFound`, a category owned
//! by someone else is `CategoryForbidden`.

use std::sync::Arc;

use serde::Serialize;

use crate::context::OpContext;
use crate::error::{Error, Result, ResultExt};
use crate::model::{
    Category, CategoryId, CategoryShare, Permission, ShareWithUser, SharedCategory, UserId,
};
use crate::store::{Backend, CategoryStore, ShareRegistry, UserDirectory};

/// Categories a user can see, split by how they got access.
#[derive(Debug, Clone, Serialize)]
pub struct AccessibleCategories {
    pub owned: Vec<Category>,
    pub shared: Vec<SharedCategory>,
}

pub struct SharingService {
    store: Arc<dyn Backend>,
}

impl SharingService {
    pub fn new(store: Arc<dyn Backend>) -> Self {
        Self { store }
    }

    fn owned_category(
        &self,
        ctx: &OpContext,
        owner_id: UserId,
        category_id: CategoryId,
    ) -> Result<Category> {
        let category = self
            .store
            .category_by_id(ctx, category_id)?
            .ok_or(Error::CategoryNotFound(category_id))?;
        if category.owner_id != owner_id {
            tracing::debug!(owner_id, category_id, "sharing refused for non-owner");
            return Err(Error::CategoryForbidden(category_id));
        }
        Ok(category)
    }

    /// Grant `target_email` access to a category owned by `owner_id`.
    ///
    /// Sharing is create-once: an existing grant for the pair is a conflict, use
    /// [`update_permission`](Self::update_permission) to change it.
    pub fn share(
        &self,
        ctx: &OpContext,
        owner_id: UserId,
        category_id: CategoryId,
        target_email: &str,
        permission: Permission,
    ) -> Result<CategoryShare> {
        self.owned_category(ctx, owner_id, category_id)
            .within("share category")?;

        let target = self
            .store
            .user_by_email(ctx, target_email)
            .within("share category")?
            .ok_or_else(|| Error::UserNotFound(target_email.trim().to_lowercase()))?;
        if target.id == owner_id {
            return Err(Error::CannotShareWithSelf);
        }

        if self
            .store
            .share_for(ctx, category_id, target.id)
            .within("share category")?
            .is_some()
        {
            return Err(Error::ShareAlreadyExists {
                category_id,
                user_id: target.id,
            });
        }

        // The store enforces pair uniqueness too; a racing grant surfaces as ShareAlreadyExists.
        let share = self
            .store
            .create_share(ctx, category_id, target.id, permission)
            .within("share category")?;
        tracing::info!(
            category_id,
            user_id = target.id,
            permission = %permission,
            "category shared"
        );
        Ok(share)
    }

    /// Revoke a grant. Revoking a grant that no longer exists is `ShareNotFound`.
    pub fn unshare(
        &self,
        ctx: &OpContext,
        owner_id: UserId,
        category_id: CategoryId,
        target_user_id: UserId,
    ) -> Result<()> {
        self.owned_category(ctx, owner_id, category_id)
            .within("unshare category")?;

        let removed = self
            .store
            .delete_share(ctx, category_id, target_user_id)
            .within("unshare category")?;
        if !removed {
            return Err(Error::ShareNotFound {
                category_id,
                user_id: target_user_id,
            });
        }
        tracing::info!(category_id, user_id = target_user_id, "category share revoked");
        Ok(())
    }

    /// Change the permission of an existing grant in place.
    pub fn update_permission(
        &self,
        ctx: &OpContext,
        owner_id: UserId,
        category_id: CategoryId,
        target_user_id: UserId,
        permission: Permission,
    ) -> Result<CategoryShare> {
        self.owned_category(ctx, owner_id, category_id)
            .within("update share permission")?;

        let share = self
            .store
            .share_for(ctx, category_id, target_user_id)
            .within("update share permission")?
            .ok_or(Error::ShareNotFound {
                category_id,
                user_id: target_user_id,
            })?;

        // A revoke racing this call surfaces from the store as ShareNotFound.
        let updated = self
            .store
            .update_share_permission(ctx, category_id, target_user_id, permission)
            .within("update share permission")?;
        tracing::info!(
            category_id,
            user_id = target_user_id,
            from = %share.permission,
            to = %permission,
            "share permission updated"
        );
        Ok(updated)
    }

    /// All grants on a category, owner only.
    pub fn list_shares(
        &self,
        ctx: &OpContext,
        category_id: CategoryId,
        requester_id: UserId,
    ) -> Result<Vec<ShareWithUser>> {
        self.owned_category(ctx, requester_id, category_id)
            .within("list shares")?;
        self.store
            .shares_for_category(ctx, category_id)
            .within("list shares")
    }

    /// Categories owned by `user_id` plus those shared with them.
    pub fn list_accessible(&self, ctx: &OpContext, user_id: UserId) -> Result<AccessibleCategories> {
        let owned = self
            .store
            .categories_by_owner(ctx, user_id)
            .within("list accessible categories")?;
        let shared = self
            .store
            .shared_categories_for_user(ctx, user_id)
            .within("list accessible categories")?;
        Ok(AccessibleCategories { owned, shared })
    }
}
