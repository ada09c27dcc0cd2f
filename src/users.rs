//! User directory operations.

use std::sync::Arc;

use crate::context::OpContext;
use crate::error::{Error, Result, ResultExt};
use crate::model::{User, UserId};
use crate::store::{Backend, UserDirectory};

pub struct UserService {
    store: Arc<dyn Backend>,
}

impl UserService {
    pub fn new(store: Arc<dyn Backend>) -> Self {
        Self { store }
    }

    /// Register a user. The email is trimmed and lower-cased before it is stored.
    pub fn add(&self, ctx: &OpContext, email: &str, name: &str) -> Result<User> {
        let user = self.store.add_user(ctx, email, name).within("add user")?;
        tracing::info!(user_id = user.id, email = %user.email, "user added");
        Ok(user)
    }

    pub fn by_email(&self, ctx: &OpContext, email: &str) -> Result<User> {
        self.store
            .user_by_email(ctx, email)
            .within("get user")?
            .ok_or_else(|| Error::UserNotFound(email.trim().to_lowercase()))
    }

    pub fn by_id(&self, ctx: &OpContext, id: UserId) -> Result<User> {
        self.store
            .user_by_id(ctx, id)
            .within("get user")?
            .ok_or_else(|| Error::UserNotFound(id.to_string()))
    }

    /// Look a user up by email, or by numeric id when the input is all digits.
    pub fn lookup(&self, ctx: &OpContext, reference: &str) -> Result<User> {
        let reference = reference.trim();
        match reference.parse::<UserId>() {
            Ok(id) => self.by_id(ctx, id),
            Err(_) => self.by_email(ctx, reference),
        }
    }

    pub fn list(&self, ctx: &OpContext) -> Result<Vec<User>> {
        self.store.list_users(ctx).within("list users")
    }

    /// Change a display name; email is immutable.
    pub fn rename(&self, ctx: &OpContext, id: UserId, name: &str) -> Result<User> {
        self.store.rename_user(ctx, id, name).within("rename user")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn add_normalizes_email() {
        let users = service();
        let ctx = OpContext::background();
        let user = users.add(&ctx, "  Alice@Example.COM ", "Alice").unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(users.lookup(&ctx, "ALICE@example.com").unwrap().id, user.id);
        assert_eq!(users.lookup(&ctx, &user.id.to_string()).unwrap().id, user.id);
    }

    #[test]
    fn rename_keeps_email_and_rejects_blank() {
        let users = service();
        let ctx = OpContext::background();
        let user = users.add(&ctx, "bob@example.com", "Bob").unwrap();

        let renamed = users.rename(&ctx, user.id, "Robert").unwrap();
        assert_eq!(renamed.name, "Robert");
        assert_eq!(renamed.email, "bob@example.com");
        assert!(matches!(
            users.rename(&ctx, user.id, " "),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            users.rename(&ctx, 42, "Ghost"),
            Err(Error::UserNotFound(_))
        ));
    }

    #[test]
    fn unknown_email_is_not_found() {
        let users = service();
        let err = users
            .by_email(&OpContext::background(), "nobody@example.com")
            .expect_err("missing");
        assert!(matches!(err, Error::UserNotFound(_)));
    }
}
