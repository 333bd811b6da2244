//! projectpro init command implementation
//!
//! Creates the store directory, empty collections and a default config.

use std::path::{Path, PathBuf};

use crate::cli::Context;
use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::store::Store;

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    store: bool,
}

pub fn run(ctx: &Context) -> Result<()> {
    let store = Store::new(&ctx.root);
    let created_store = store.init()?;
    let created_config = ensure_config(&ctx.root)?;

    let report = InitReport {
        root: ctx.root.clone(),
        created: InitCreated {
            config: created_config,
            store: created_store,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(CONFIG_FILE.to_string());
    }
    if created_store {
        created_items.push(format!("{}/", crate::store::STORE_DIR));
    }

    let mut human = HumanOutput::new(if created_items.is_empty() {
        "Already initialized"
    } else {
        "Initialized"
    });
    human.push_summary("Root", ctx.root.display().to_string());
    if !created_items.is_empty() {
        human.push_summary("Created", created_items.join(", "));
    }
    human.push_next_step("projectpro project new \"My first project\"");

    emit_success(ctx.output, "init", &report, Some(&human))
}

fn ensure_config(root: &Path) -> Result<bool> {
    let path = root.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }
    Config::default().save(&path)?;
    Ok(true)
}
