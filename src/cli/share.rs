//! todoshare share command implementations.

use crate::app::App;
use crate::cli::GlobalOptions;
use crate::error::Result;
use crate::model::{CategoryId, Permission, UserId};
use crate::output::{emit_success, HumanOutput};

pub struct AddOptions {
    pub category_id: CategoryId,
    pub email: String,
    pub permission: Permission,
    pub global: GlobalOptions,
}

pub struct RmOptions {
    pub category_id: CategoryId,
    pub target: String,
    pub global: GlobalOptions,
}

pub struct SetOptions {
    pub category_id: CategoryId,
    pub target: String,
    pub permission: Permission,
    pub global: GlobalOptions,
}

pub struct ListOptions {
    pub category_id: CategoryId,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct ShareRmReport {
    category_id: CategoryId,
    user_id: UserId,
    revoked: bool,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let share = app.sharing().share(
        &ctx,
        me.id,
        options.category_id,
        &options.email,
        options.permission,
    )?;

    let mut human = HumanOutput::new(format!(
        "todoshare share add: category #{} shared with {}",
        options.category_id,
        options.email.trim()
    ));
    human.push_summary("permission", share.permission.to_string());
    human.push_next_step(format!("todoshare share list {}", options.category_id));

    emit_success(options.global.output(), "share add", &share, Some(&human))
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let target = app.users().lookup(&ctx, &options.target)?;
    app.sharing()
        .unshare(&ctx, me.id, options.category_id, target.id)?;

    let human = HumanOutput::new(format!(
        "todoshare share rm: {} can no longer access category #{}",
        target.email, options.category_id
    ));
    let report = ShareRmReport {
        category_id: options.category_id,
        user_id: target.id,
        revoked: true,
    };
    emit_success(options.global.output(), "share rm", &report, Some(&human))
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let target = app.users().lookup(&ctx, &options.target)?;
    let share = app.sharing().update_permission(
        &ctx,
        me.id,
        options.category_id,
        target.id,
        options.permission,
    )?;

    let mut human = HumanOutput::new(format!(
        "todoshare share set: {} now has {} on category #{}",
        target.email, share.permission, options.category_id
    ));
    human.push_summary("shared since", share.created_at.to_rfc3339());

    emit_success(options.global.output(), "share set", &share, Some(&human))
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let shares = app
        .sharing()
        .list_shares(&ctx, options.category_id, me.id)?;

    let mut human = HumanOutput::new(format!("Shares of category #{}", options.category_id));
    human.push_summary("Total", shares.len().to_string());
    for entry in &shares {
        human.push_detail(format!(
            "{} <{}>: {}",
            entry.shared_with_user_name, entry.shared_with_user_email, entry.share.permission
        ));
    }

    emit_success(options.global.output(), "share list", &shares, Some(&human))
}
