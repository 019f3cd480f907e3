/// Table Linter: checks category tables against the field schemas.
///
/// Usage: table_linter <tables_dir> [--strict]
///
/// `--strict` also fails on warnings.

use std::path::Path;
use std::process;
use story_spinner::core::lint::lint_tables;
use story_spinner::core::tables::CategoryTables;

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: table_linter <tables_dir> [--strict]");
        process::exit(0);
    }

    let tables_dir = &args[1];
    let mut strict = false;

    for arg in &args[2..] {
        match arg.as_str() {
            "--strict" => strict = true,
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
    }

    let dir = Path::new(tables_dir);
    if !dir.is_dir() {
        eprintln!("ERROR: '{}' is not a directory", tables_dir);
        process::exit(1);
    }

    let tables = match CategoryTables::load_from_dir(dir) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("ERROR: Failed to load tables: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded tables from {} ({} tarot layouts, {} cards)",
        tables_dir,
        tables.tarot_layouts().len(),
        tables.tarot_deck().len()
    );

    let report = lint_tables(&tables);

    println!("\n=== Table Lint Report ===\n");

    if report.is_clean() {
        println!("All checks passed!");
    }

    for warning in report.warnings() {
        println!("WARNING: {}", warning);
    }

    for error in report.errors() {
        println!("ERROR: {}", error);
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    println!("\nSummary: {} errors, {} warnings", errors, warnings);

    if errors > 0 || (strict && warnings > 0) {
        process::exit(1);
    }
}
