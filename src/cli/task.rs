//! todoshare task command implementations.

use crate::app::App;
use crate::cli::GlobalOptions;
use crate::error::Result;
use crate::model::{CategoryId, Task, TaskId, TaskPage};
use crate::output::{emit_success, HumanOutput};
use crate::tasks::{CategoryRef, TaskPatch};

pub struct NewOptions {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub category_id: Option<CategoryId>,
    pub global: GlobalOptions,
}

pub struct ShowOptions {
    pub id: TaskId,
    pub global: GlobalOptions,
}

pub struct ListOptions {
    pub page: i64,
    pub page_size: i64,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<CategoryId>,
    pub global: GlobalOptions,
}

pub struct RmOptions {
    pub id: TaskId,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct TaskRmReport {
    id: TaskId,
    deleted: bool,
}

pub(crate) fn task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{mark}] #{} {}", task.id, task.title)
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("category", task.category_id.to_string());
    human.push_summary("completed", task.completed.to_string());
    human.push_summary("owner", task.owner_user_id.to_string());
    human.push_summary("created by", task.created_by_user_id.to_string());
    if !task.description.is_empty() {
        human.push_detail(task.description.clone());
    }
}

pub(crate) fn push_page(human: &mut HumanOutput, page: &TaskPage) {
    human.push_summary("Total", page.total.to_string());
    human.push_summary("Page", format!("{}/{}", page.page, page.total_pages.max(1)));
    for task in &page.tasks {
        human.push_detail(task_line(task));
    }
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;

    let category = CategoryRef {
        id: options.category_id,
        name: options.category,
    };
    let task = app
        .tasks()
        .create(&ctx, me.id, &options.title, &options.description, &category)?;

    let mut human = HumanOutput::new(format!("todoshare task new: created #{}", task.id));
    push_task_summary(&mut human, &task);
    human.push_next_step(format!("todoshare task show {}", task.id));

    emit_success(options.global.output(), "task new", &task, Some(&human))
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let task = app.tasks().get(&ctx, me.id, options.id)?;

    let mut human = HumanOutput::new(task_line(&task));
    push_task_summary(&mut human, &task);

    emit_success(options.global.output(), "task show", &task, Some(&human))
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    let page = app
        .tasks()
        .list(&ctx, me.id, options.page, options.page_size)?;

    let mut human = HumanOutput::new("Todos");
    push_page(&mut human, &page);
    if page.page < page.total_pages {
        human.push_next_step(format!("todoshare task list --page {}", page.page + 1));
    }

    emit_success(options.global.output(), "task list", &page, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;

    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        completed: options.completed,
        category_id: options.category_id,
    };
    let task = app.tasks().update(&ctx, me.id, options.id, &patch)?;

    let mut human = HumanOutput::new(format!("todoshare task edit: updated #{}", task.id));
    push_task_summary(&mut human, &task);

    emit_success(options.global.output(), "task edit", &task, Some(&human))
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, options.global.user.as_deref())?;
    app.tasks().delete(&ctx, me.id, options.id)?;

    let human = HumanOutput::new(format!("todoshare task rm: deleted #{}", options.id));
    let report = TaskRmReport {
        id: options.id,
        deleted: true,
    };
    emit_success(options.global.output(), "task rm", &report, Some(&human))
}
