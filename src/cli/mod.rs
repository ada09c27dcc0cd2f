//! Command-line interface for todoshare
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::model::{CategoryId, Permission, TaskId};

mod actor;
mod board;
mod category;
mod share;
mod task;
mod user;

/// todoshare - todos organized in categories you can share
///
/// Every todo lives in exactly one category. Owners share categories with other users at
/// read or write level; todos follow the owner of their category.
#[derive(Parser, Debug)]
#[command(name = "todoshare")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "TODOSHARE_HOME")]
    pub data_dir: Option<PathBuf>,

    /// Acting user (email or id); falls back to TODOSHARE_USER, `actor set`, then config
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register and list users
    #[command(subcommand)]
    User(UserCommands),

    /// Set or show the acting user
    #[command(subcommand)]
    Actor(ActorCommands),

    /// Manage todos
    #[command(subcommand)]
    Task(TaskCommands),

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Grant, change and revoke category access
    #[command(subcommand)]
    Share(ShareCommands),

    /// Every accessible category with its todos
    Board,
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user
    Add {
        /// Email address (stored lower-case)
        email: String,

        /// Display name
        #[arg(long)]
        name: String,
    },

    /// List registered users
    List,

    /// Change the acting user's display name
    Rename {
        /// New display name
        name: String,
    },
}

/// Actor subcommands
#[derive(Subcommand, Debug)]
pub enum ActorCommands {
    /// Persist the acting user for this data directory
    Set {
        /// Email or id of an existing user
        #[arg(value_name = "USER")]
        target: String,
    },

    /// Show the resolved acting user
    Show,
}

/// Todo subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a todo
    New {
        /// Todo title
        title: String,

        /// Longer description
        #[arg(long, default_value = "")]
        description: String,

        /// Category name, created for you when missing
        #[arg(long)]
        category: Option<String>,

        /// Existing category id (wins over --category)
        #[arg(long)]
        category_id: Option<CategoryId>,
    },

    /// Show a todo
    Show {
        id: TaskId,
    },

    /// List todos you own or that are shared with you
    List {
        /// Page number (clamped to 1)
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        /// Page size (0 or less uses the configured default)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page_size: i64,
    },

    /// Change fields of a todo
    Edit {
        id: TaskId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Mark as completed
        #[arg(long, conflicts_with = "undone")]
        done: bool,

        /// Mark as not completed
        #[arg(long)]
        undone: bool,

        /// Move to another category
        #[arg(long)]
        category_id: Option<CategoryId>,
    },

    /// Delete a todo
    Rm {
        id: TaskId,
    },
}

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    New {
        name: String,
    },

    /// List owned and shared categories
    List,

    /// Show a category
    Show {
        id: CategoryId,
    },

    /// Rename a category you own
    Rename {
        id: CategoryId,
        name: String,
    },

    /// Delete a category you own, with its todos and shares
    Rm {
        id: CategoryId,
    },

    /// List the todos of one category
    Tasks {
        id: CategoryId,

        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page_size: i64,
    },

    /// Show your permission on a category
    Perm {
        id: CategoryId,
    },
}

/// Share subcommands
#[derive(Subcommand, Debug)]
pub enum ShareCommands {
    /// Share a category you own with another user
    Add {
        category_id: CategoryId,

        /// Email of the user to share with
        email: String,

        /// read or write
        #[arg(long, default_value = "read")]
        permission: Permission,
    },

    /// Revoke a user's access
    Rm {
        category_id: CategoryId,

        /// Email or id of the user
        #[arg(value_name = "USER")]
        target: String,
    },

    /// Change a user's permission
    Set {
        category_id: CategoryId,

        /// Email or id of the user
        #[arg(value_name = "USER")]
        target: String,

        /// read or write
        permission: Permission,
    },

    /// List the shares of a category you own
    List {
        category_id: CategoryId,
    },
}

/// Global flags every command receives
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub data_dir: Option<PathBuf>,
    pub user: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub(crate) fn output(&self) -> crate::output::OutputOptions {
        crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            data_dir: self.data_dir,
            user: self.user,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::User(cmd) => match cmd {
                UserCommands::Add { email, name } => {
                    user::run_add(user::AddOptions { email, name, global })
                }
                UserCommands::List => user::run_list(global),
                UserCommands::Rename { name } => {
                    user::run_rename(user::RenameOptions { name, global })
                }
            },
            Commands::Actor(cmd) => match cmd {
                ActorCommands::Set { target } => {
                    actor::run_set(actor::SetOptions { target, global })
                }
                ActorCommands::Show => actor::run_show(global),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::New {
                    title,
                    description,
                    category,
                    category_id,
                } => task::run_new(task::NewOptions {
                    title,
                    description,
                    category,
                    category_id,
                    global,
                }),
                TaskCommands::Show { id } => task::run_show(task::ShowOptions { id, global }),
                TaskCommands::List { page, page_size } => task::run_list(task::ListOptions {
                    page,
                    page_size,
                    global,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    done,
                    undone,
                    category_id,
                } => task::run_edit(task::EditOptions {
                    id,
                    title,
                    description,
                    completed: match (done, undone) {
                        (true, _) => Some(true),
                        (_, true) => Some(false),
                        _ => None,
                    },
                    category_id,
                    global,
                }),
                TaskCommands::Rm { id } => task::run_rm(task::RmOptions { id, global }),
            },
            Commands::Category(cmd) => match cmd {
                CategoryCommands::New { name } => {
                    category::run_new(category::NewOptions { name, global })
                }
                CategoryCommands::List => category::run_list(global),
                CategoryCommands::Show { id } => {
                    category::run_show(category::ShowOptions { id, global })
                }
                CategoryCommands::Rename { id, name } => {
                    category::run_rename(category::RenameOptions { id, name, global })
                }
                CategoryCommands::Rm { id } => category::run_rm(category::RmOptions { id, global }),
                CategoryCommands::Tasks {
                    id,
                    page,
                    page_size,
                } => category::run_tasks(category::TasksOptions {
                    id,
                    page,
                    page_size,
                    global,
                }),
                CategoryCommands::Perm { id } => {
                    category::run_perm(category::PermOptions { id, global })
                }
            },
            Commands::Share(cmd) => match cmd {
                ShareCommands::Add {
                    category_id,
                    email,
                    permission,
                } => share::run_add(share::AddOptions {
                    category_id,
                    email,
                    permission,
                    global,
                }),
                ShareCommands::Rm {
                    category_id,
                    target,
                } => share::run_rm(share::RmOptions {
                    category_id,
                    target,
                    global,
                }),
                ShareCommands::Set {
                    category_id,
                    target,
                    permission,
                } => share::run_set(share::SetOptions {
                    category_id,
                    target,
                    permission,
                    global,
                }),
                ShareCommands::List { category_id } => {
                    share::run_list(share::ListOptions {
                        category_id,
                        global,
                    })
                }
            },
            Commands::Board => board::run(global),
        }
    }
}
