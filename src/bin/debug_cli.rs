//! Debug CLI for exercising the inventory collaborator without a TTY
//!
//! Usage:
//!   cargo run --bin debug_cli -- <command>
//!
//! Commands:
//!   list    Print outdated direct modules, one per line
//!   json    Print the filtered records as JSON

use std::env;

use color_eyre::Result;

use modup::gomod;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args: Vec<String> = env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("help");

    match cmd {
        "list" => cmd_list()?,
        "json" => cmd_json()?,
        _ => {
            println!("Debug CLI for modup");
            println!();
            println!("Commands:");
            println!("  list    Print outdated direct modules, one per line");
            println!("  json    Print the filtered records as JSON");
        }
    }

    Ok(())
}

fn cmd_list() -> Result<()> {
    let modules = gomod::list_outdated()?;
    if modules.is_empty() {
        println!("All modules are up-to-date.");
        return Ok(());
    }
    for module in &modules {
        let target = module
            .update
            .as_ref()
            .map_or("?", |update| update.version.as_str());
        println!("{} [{} -> {target}]", module.path, module.version);
    }
    Ok(())
}

fn cmd_json() -> Result<()> {
    let modules = gomod::list_outdated()?;
    println!("{}", serde_json::to_string_pretty(&modules)?);
    Ok(())
}
