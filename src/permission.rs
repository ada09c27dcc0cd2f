//! Permission resolution for (user, category) pairs.
//!
//! Resolution is read-through on every call; a revoked grant stops working for the very next
//! request.

use crate::context::OpContext;
use crate::error::{Error, Result};
use crate::model::{Category, CategoryId, PermissionLevel, UserId};
use crate::store::{CategoryStore, ShareRegistry};

/// Answers "what can this user do with this category?".
pub struct PermissionResolver<'a, S: CategoryStore + ShareRegistry + ?Sized> {
    store: &'a S,
}

impl<'a, S: CategoryStore + ShareRegistry + ?Sized> PermissionResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Effective level of `user_id` on `category_id`.
    ///
    /// The owner check is terminal: a share row for the owner, if one ever existed, is never
    /// consulted.
    pub fn resolve(
        &self,
        ctx: &OpContext,
        user_id: UserId,
        category_id: CategoryId,
    ) -> Result<PermissionLevel> {
        self.resolve_with_category(ctx, user_id, category_id)
            .map(|(_, level)| level)
    }

    /// Like [`resolve`](Self::resolve), also returning the category record.
    pub fn resolve_with_category(
        &self,
        ctx: &OpContext,
        user_id: UserId,
        category_id: CategoryId,
    ) -> Result<(Category, PermissionLevel)> {
        let category = self
            .store
            .category_by_id(ctx, category_id)?
            .ok_or(Error::CategoryNotFound(category_id))?;

        if category.owner_id == user_id {
            return Ok((category, PermissionLevel::Owner));
        }

        let level = match self.store.share_for(ctx, category_id, user_id)? {
            Some(share) => PermissionLevel::from(share.permission),
            None => PermissionLevel::None,
        };
        Ok((category, level))
    }

    /// Fails unless `user_id` holds at least `required` on `category_id`.
    ///
    /// `CategoryNotFound` propagates as-is; no access at all is `Forbidden`; read access where
    /// write was needed is `NoWritePermission`.
    pub fn require(
        &self,
        ctx: &OpContext,
        user_id: UserId,
        category_id: CategoryId,
        required: PermissionLevel,
    ) -> Result<Category> {
        let (category, level) = self.resolve_with_category(ctx, user_id, category_id)?;
        if level.allows(required) {
            return Ok(category);
        }

        tracing::debug!(
            user_id,
            category_id,
            held = %level,
            required = %required,
            "permission denied"
        );
        if level == PermissionLevel::None {
            Err(Error::Forbidden(category_id))
        } else {
            Err(Error::NoWritePermission(category_id))
        }
    }
}
