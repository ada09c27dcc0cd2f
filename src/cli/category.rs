//! todoshare category command implementations.

use crate::app::App;
use crate::cli::task::push_page;
use crate::cli::GlobalOptions;
use crate::error::Result;
use crate::model::{Category, CategoryId, PermissionLevel};
use crate::output::{emit_success, HumanOutput};

pub struct NewOptions {
    pub name: String,
    pub global: GlobalOptions,
}

pub struct ShowOptions {
    pub id: CategoryId,
    pub global: GlobalOptions,
}

pub struct RenameOptions {
    pub id: CategoryId,
    pub name: String,
    pub global: GlobalOptions,
}

pub struct RmOptions {
    pub id: CategoryId,
    pub global: GlobalOptions,
}

pub struct TasksOptions {
    pub id: CategoryId,
    pub page: i64,
    pub page_size: i64,
    pub global: GlobalOptions,
}

pub struct PermOptions {
    pub id: CategoryId,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct CategoryRmReport {
    id: CategoryId,
    deleted: bool,
}

#[derive(serde::Serialize)]
struct PermissionReport {
    category_id: CategoryId,
    permission: PermissionLevel,
}

fn category_line(category: &Category) -> String {
    format!("#{} {}", category.id, category.name)
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let category = app.categories().create(&ctx, me.id, &options.name)?;

    let mut human = HumanOutput::new(format!(
        "todoshare category new: {}",
        category_line(&category)
    ));
    human.push_next_step(format!(
        "todoshare share add {} <email> --permission write",
        category.id
    ));

    emit_success(options.global.output(), "category new", &category, Some(&human))
}

pub fn run_list(global: GlobalOptions) -> Result<()> {
    let app = App::open(global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, global.user.as_deref())?;
    let accessible = app.sharing().list_accessible(&ctx, me.id)?;

    let mut human = HumanOutput::new("Categories");
    human.push_summary("Owned", accessible.owned.len().to_string());
    human.push_summary("Shared with you", accessible.shared.len().to_string());
    for category in &accessible.owned {
        human.push_detail(format!("{} (owner)", category_line(category)));
    }
    for shared in &accessible.shared {
        human.push_detail(format!(
            "{} ({} from {} <{}>)",
            category_line(&shared.category),
            shared.permission,
            shared.owner_name,
            shared.owner_email
        ));
    }

    emit_success(global.output(), "category list", &accessible, Some(&human))
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let category = app.categories().get(&ctx, me.id, options.id)?;
    let level = app.categories().permission(&ctx, me.id, options.id)?;

    let mut human = HumanOutput::new(category_line(&category));
    human.push_summary("owner", category.owner_id.to_string());
    human.push_summary("permission", level.to_string());

    emit_success(options.global.output(), "category show", &category, Some(&human))
}

pub fn run_rename(options: RenameOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let category = app
        .categories()
        .rename(&ctx, me.id, options.id, &options.name)?;

    let human = HumanOutput::new(format!(
        "todoshare category rename: {}",
        category_line(&category)
    ));
    emit_success(options.global.output(), "category rename", &category, Some(&human))
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    app.categories().delete(&ctx, me.id, options.id)?;

    let mut human = HumanOutput::new(format!(
        "todoshare category rm: deleted #{}",
        options.id
    ));
    human.push_warning("its todos and shares were removed as well");
    let report = CategoryRmReport {
        id: options.id,
        deleted: true,
    };
    emit_success(options.global.output(), "category rm", &report, Some(&human))
}

pub fn run_tasks(options: TasksOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let page = app.categories().list_tasks(
        &ctx,
        me.id,
        options.id,
        options.page,
        options.page_size,
    )?;

    let mut human = HumanOutput::new(format!("Todos in category #{}", options.id));
    push_page(&mut human, &page);

    emit_success(options.global.output(), "category tasks", &page, Some(&human))
}

pub fn run_perm(options: PermOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let permission = app.categories().permission(&ctx, me.id, options.id)?;

    let human = HumanOutput::new(format!(
        "todoshare category perm: {permission} on #{}",
        options.id
    ));
    let report = PermissionReport {
        category_id: options.id,
        permission,
    };
    emit_success(options.global.output(), "category perm", &report, Some(&human))
}
