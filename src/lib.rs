//! todoshare - multi-tenant todo tracking with shareable categories
//!
//! Every todo belongs to exactly one category, and categories are the unit of sharing: an
//! owner grants other users `read` or `write` access, and every operation on a todo is
//! checked against the caller's effective permission on its category.
//!
//! # Core Concepts
//!
//! - **Categories**: user-owned, uniquely named per owner
//! - **Shares**: at most one grant per (category, user), never to the owner
//! - **Permission levels**: `none < read < write < owner`, resolved fresh on every call
//! - **Todos**: owned by their category's owner, soft-deleted, movable between categories
//! - **Grouped view**: accessible categories with their live todos, in name order
//!
//! # Module Organization
//!
//! - `permission`: permission resolution
//! - `sharing`: grant lifecycle
//! - `tasks`: todo lifecycle and paginated listing
//! - `category`: explicit category management
//! - `users`: user directory operations
//! - `grouped`: flat rows to nested category view
//! - `store`: persistence traits plus the memory and file stores
//! - `context`: deadlines and cancellation
//! - `config`: configuration from `config.toml`
//! - `storage`, `lock`: data directory layout, file locking, atomic writes
//! - `cli`, `output`, `actor`, `app`: the command-line front end

pub mod actor;
pub mod app;
pub mod category;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod grouped;
pub mod lock;
pub mod model;
pub mod output;
pub mod permission;
pub mod sharing;
pub mod storage;
pub mod store;
pub mod tasks;
pub mod users;

pub use error::{Error, ErrorKind, Result};
