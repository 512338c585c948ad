//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a configured store, optionally seed it and print row counts.
//! - Exit non-zero with a one-line message on any setup failure.

use log::info;
use recordkeep_core::{
    core_version, init_logging, open_db, open_db_in_memory, seed_demo_data, CoreConfig,
    MenuService, RecordStore, SqliteCategoryRepository, SqliteMenuItemRepository,
    SqliteTodoRepository,
};
use std::error::Error;
use std::process::ExitCode;

type BoxError = Box<dyn Error>;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("recordkeep: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), BoxError> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    if config.seed_demo {
        let summary = seed_demo_data(&conn)?;
        info!(
            "event=cli_seed module=cli status=ok categories={} menu_items={} todo_items={}",
            summary.categories, summary.menu_items, summary.todo_items
        );
    }

    let categories = SqliteCategoryRepository::try_new(&conn)?;
    let menu_items = SqliteMenuItemRepository::try_new(&conn)?;
    let todos = SqliteTodoRepository::try_new(&conn)?;
    let todo_count = todos.list()?.len();
    let menu = MenuService::new(categories, menu_items).full_menu(true)?;

    println!("recordkeep_core version={}", core_version());
    println!(
        "database={}",
        config
            .db_path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string())
    );
    println!("categories={}", menu.len());
    for entry in &menu {
        println!(
            "  {} {} items={}",
            entry.category.category_id,
            entry.category.category_name,
            entry.items.len()
        );
    }
    println!("todo_items={todo_count}");
    Ok(())
}
