//! Main application entry point.

use circuitsketch_app::{App, AppConfig, AppError};
use circuitsketch_core::ShortcutRegistry;
use std::path::Path;

fn print_shortcuts() {
    println!("\n=== Keyboard Shortcuts ===");
    for shortcut in ShortcutRegistry::all() {
        println!("  {:20} {}", shortcut.format(), shortcut.description);
    }
    println!();
}

fn run() -> Result<(), AppError> {
    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--shortcuts") {
        print_shortcuts();
        return Ok(());
    }

    let config = match arg {
        Some(path) => AppConfig::load(Path::new(&path))?,
        None => AppConfig::default(),
    };
    let wires = App::run(config)?;
    println!("{}", serde_json::to_string_pretty(&wires)?);
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
