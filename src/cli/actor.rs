//! todoshare actor command implementation
//!
//! Provides acting user helpers (set/show).

use std::path::PathBuf;

use crate::actor;
use crate::app::App;
use crate::cli::GlobalOptions;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

/// Options for `todoshare actor set`
pub struct SetOptions {
    pub target: String,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct ActorSetReport {
    id: u64,
    email: String,
    path: PathBuf,
}

#[derive(serde::Serialize)]
struct ActorShowReport {
    id: u64,
    email: String,
    name: String,
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let app = App::open(options.global.data_dir.clone())?;
    let ctx = app.context();

    // Only existing users can act.
    let user = app.users().lookup(&ctx, &options.target)?;
    actor::persist_actor(app.storage(), &user.email)?;
    let actor_path = app.storage().actor_file();

    let report = ActorSetReport {
        id: user.id,
        email: user.email.clone(),
        path: actor_path.clone(),
    };

    let mut human = HumanOutput::new(format!("todoshare actor set: {}", user.email));
    human.push_summary("actor", user.email);
    human.push_summary("path", actor_path.display().to_string());
    human.push_next_step("todoshare board");

    emit_success(options.global.output(), "actor set", &report, Some(&human))
}

pub fn run_show(global: GlobalOptions) -> Result<()> {
    let app = App::open(global.data_dir.clone())?;
    let ctx = app.context();
    let user = app.acting_user(&ctx, global.user.as_deref())?;

    let mut human = HumanOutput::new(format!("todoshare actor: {}", user.email));
    human.push_summary("id", user.id.to_string());
    human.push_summary("name", user.name.clone());

    let report = ActorShowReport {
        id: user.id,
        email: user.email,
        name: user.name,
    };
    emit_success(global.output(), "actor show", &report, Some(&human))
}
