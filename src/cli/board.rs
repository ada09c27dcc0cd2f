//! todoshare board: the grouped category view.

use crate::app::App;
use crate::cli::GlobalOptions;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

pub fn run(global: GlobalOptions) -> Result<()> {
    let app = App::open(global.data_dir.clone())?;
    let ctx = app.context();
    let me = app.acting_user(&ctx, global.user.as_deref())?;
    let view = app.tasks().grouped_view(&ctx, me.id)?;

    let mut human = HumanOutput::new(format!("Board for {}", me.email));
    human.push_summary("Categories", view.categories.len().to_string());
    for group in &view.categories {
        human.push_detail(format!(
            "#{} {} ({}, owner {})",
            group.id, group.name, group.user_permission, group.owner_name
        ));
        if group.tasks.is_empty() {
            human.push_detail("    (no todos)");
        }
        for task in &group.tasks {
            let mark = if task.completed { "x" } else { " " };
            human.push_detail(format!(
                "    [{mark}] #{} {} (by {})",
                task.id, task.title, task.creator_name
            ));
        }
    }
    if view.categories.is_empty() {
        human.push_next_step("todoshare task new <title> --category <name>");
    }

    emit_success(global.output(), "board", &view, Some(&human))
}
