//! The interactive manager menu.

use std::io::{self, Write};
use std::path::Path;

use paddock_common::constants::DEFAULT_SHELL;
use paddock_common::error::PaddockError;
use paddock_runtime::manager::{DeleteOutcome, Manager};

/// Runs the menu loop until the user exits, then cleans up every
/// tracked container.
///
/// # Errors
///
/// Returns an error only if the controlling terminal goes away.
pub fn run(mut manager: Manager) -> anyhow::Result<()> {
    println!("Container Manager");
    println!("=================");

    loop {
        print_menu();
        let Some(choice) = prompt("Enter choice: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => launch(&mut manager)?,
            "2" => list(&manager),
            "3" => delete(&mut manager)?,
            "4" => shell(&manager)?,
            "5" | "q" | "Q" | "exit" => break,
            _ => println!("Invalid choice. Please try again."),
        }

        println!();
    }

    println!("Exiting...");
    println!("Cleaning up all containers...");
    manager.cleanup_all();
    Ok(())
}

fn print_menu() {
    println!();
    println!("Menu:");
    println!("  1. Launch a container");
    println!("  2. List all containers");
    println!("  3. Delete a container");
    println!("  4. Shell into a container");
    println!("  5. Exit");
    println!();
}

/// Prints `text` and reads one trimmed line; `None` on end of input.
fn prompt(text: &str) -> anyhow::Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn launch(manager: &mut Manager) -> anyhow::Result<()> {
    let input =
        prompt("Enter full binary path to execute in the container (default: /bin/sh): ")?
            .unwrap_or_default();
    let binary = if input.is_empty() {
        DEFAULT_SHELL.to_string()
    } else {
        input
    };

    println!("Launching container with binary: {binary}");
    match manager.launch(Path::new(&binary)) {
        Ok(container) => println!(
            "Container '{}' launched successfully (PID: {})",
            container.name, container.namespace_pid
        ),
        Err(e) => println!("Error launching container: {e}"),
    }
    Ok(())
}

fn list(manager: &Manager) {
    println!("\n=== Containers ===");

    let listings = manager.list();
    if listings.is_empty() {
        println!("No containers found.");
        return;
    }

    println!("\nRunning:");
    for entry in &listings {
        println!(
            "  - {} (PID: {}, Status: {})",
            entry.name, entry.pid, entry.status
        );
    }
}

fn delete(manager: &mut Manager) -> anyhow::Result<()> {
    let Some(name) = prompt("Enter container name to delete: ")? else {
        return Ok(());
    };
    if name.is_empty() {
        println!("Container name is required");
        return Ok(());
    }

    match manager.delete(&name) {
        DeleteOutcome::Deleted => println!("Container '{name}' deleted successfully"),
        DeleteOutcome::NotFound => println!("Container '{name}' not found"),
    }
    Ok(())
}

fn shell(manager: &Manager) -> anyhow::Result<()> {
    let Some(name) = prompt("Enter container name to shell into: ")? else {
        return Ok(());
    };
    if name.is_empty() {
        println!("Container name is required");
        return Ok(());
    }

    match manager.shell(&name) {
        Ok(()) => {}
        Err(PaddockError::NotFound { .. }) => println!("Container '{name}' not found"),
        Err(e @ PaddockError::NotRunning { .. }) => println!("{e}"),
        Err(e) => println!("Error entering container: {e}"),
    }
    Ok(())
}
