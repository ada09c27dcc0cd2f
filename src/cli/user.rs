//! todoshare user command implementations.

use crate::app::App;
use crate::cli::GlobalOptions;
use crate::error::Result;
use crate::model::User;
use crate::output::{emit_success, HumanOutput};

/// Options for `todoshare user add`
pub struct AddOptions {
    pub email: String,
    pub name: String,
    pub global: GlobalOptions,
}

/// Options for `todoshare user rename`
pub struct RenameOptions {
    pub name: String,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct UserListReport {
    total: usize,
    users: Vec<User>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let user = app.users().add(&ctx, &options.email, &options.name)?;

    let mut human = HumanOutput::new(format!("todoshare user add: {}", user.email));
    human.push_summary("id", user.id.to_string());
    human.push_summary("name", user.name.clone());
    human.push_next_step(format!("todoshare actor set {}", user.email));

    emit_success(options.global.output(), "user add", &user, Some(&human))
}

pub fn run_list(global: GlobalOptions) -> Result<()> {
    let app = App::open(global.data_dir.clone())?;
    let ctx = app.context();
    let users = app.users().list(&ctx)?;

    let mut human = HumanOutput::new("Users");
    human.push_summary("Total", users.len().to_string());
    for user in &users {
        human.push_detail(format!("#{} {} <{}>", user.id, user.name, user.email));
    }
    if users.is_empty() {
        human.push_next_step("todoshare user add <email> --name <name>");
    }

    let report = UserListReport {
        total: users.len(),
        users,
    };
    emit_success(global.output(), "user list", &report, Some(&human))
}

pub fn run_rename(options: RenameOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let user = app.users().rename(&ctx, me.id, &options.name)?;

    let mut human = HumanOutput::new(format!("todoshare user rename: {}", user.name));
    human.push_summary("email", user.email.clone());

    emit_success(options.global.output(), "user rename", &user, Some(&human))
}
