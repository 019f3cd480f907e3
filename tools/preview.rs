/// Preview: interactive shell for spinning characters, stories, music
/// prompts and tarot spreads from a table directory.
///
/// Usage: preview --tables <dir> [--state <dir>] [--seed <n>]
///
/// Commands:
///   gen <category>            regenerate unlocked fields
///   lock <category> <field>   toggle a field's lock
///   copy <category|tarot>     print the export text
///   tab <name>                switch the active tab
///   layouts                   list tarot layouts
///   layout <n>                select a tarot layout
///   tarot                     draw the selected layout
///   show [category|tarot]     show the current session
///   help                      list commands
///   quit                      exit

use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use story_spinner::core::controller::{
    rendered_fields, Clipboard, ClipboardError, Command, Controller, CopyTarget, Renderer,
};
use story_spinner::core::locks::LockSet;
use story_spinner::core::persistence::{FileStorage, MemoryStorage};
use story_spinner::schema::category::Category;
use story_spinner::schema::record::GeneratedRecord;
use story_spinner::schema::tarot::TarotResult;

/// Prints every render call to stdout.
struct TerminalRenderer {
    // Set while the builder renders the restored session.
    quiet: Rc<Cell<bool>>,
}

impl Renderer for TerminalRenderer {
    fn render_record(&mut self, category: Category, record: &GeneratedRecord, locks: &LockSet) {
        if self.quiet.get() {
            return;
        }
        print_record(category, record, locks);
    }

    fn render_tarot(&mut self, result: Option<&TarotResult>) {
        if self.quiet.get() {
            return;
        }
        print_tarot(result);
    }

    fn tab_changed(&mut self, tab: &str) {
        if !self.quiet.get() {
            println!("Active tab: {}", tab);
        }
    }

    fn notify(&mut self, message: &str) {
        println!("! {}", message);
    }
}

/// The terminal has no clipboard; copied text goes to stdout.
struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = io::stdout();
        writeln!(stdout, "----\n{}\n----", text).map_err(|e| ClipboardError(e.to_string()))
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut tables_dir = None;
    let mut state_dir = None;
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" if i + 1 < args.len() => {
                i += 1;
                tables_dir = Some(args[i].clone());
            }
            "--state" if i + 1 < args.len() => {
                i += 1;
                state_dir = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse::<u64>() {
                    Ok(n) => seed = Some(n),
                    Err(_) => {
                        eprintln!("Invalid seed: {}", args[i]);
                        std::process::exit(1);
                    }
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(tables_dir) = tables_dir else {
        eprintln!("--tables is required");
        print_usage();
        std::process::exit(1);
    };

    let quiet = Rc::new(Cell::new(true));
    let mut builder = Controller::builder()
        .tables_dir(&tables_dir)
        .renderer(TerminalRenderer {
            quiet: quiet.clone(),
        })
        .clipboard(StdoutClipboard);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    builder = match state_dir {
        Some(dir) => builder.storage(FileStorage::new(dir)),
        None => builder.storage(MemoryStorage::new()),
    };

    let controller = match builder.build() {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(tables) = controller.tables() {
        println!(
            "Loaded tables from {} ({} tarot layouts, {} cards)",
            tables_dir,
            tables.tarot_layouts().len(),
            tables.tarot_deck().len()
        );
    }
    println!("Active tab: {}", controller.active_tab());
    println!("Type 'help' for commands.\n");

    quiet.set(false);
    let mut session = Session { controller };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("spinner> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "gen" | "g" => match Category::parse(rest) {
                Some(category) => session.run(Command::Generate(category)),
                None => println!("Usage: gen <characters|stories|music>"),
            },
            "lock" | "l" => {
                let Some((category, field)) = rest.split_once(char::is_whitespace) else {
                    println!("Usage: lock <category> <field name>");
                    continue;
                };
                match Category::parse(category) {
                    Some(category) => session.run(Command::ToggleLock {
                        category,
                        field: field.trim().to_string(),
                    }),
                    None => println!("Unknown category: {}", category),
                }
            }
            "copy" | "c" => {
                let target = if rest.eq_ignore_ascii_case("tarot") {
                    Some(CopyTarget::Tarot)
                } else {
                    Category::parse(rest).map(CopyTarget::Record)
                };
                match target {
                    Some(target) => session.run(Command::Copy(target)),
                    None => println!("Usage: copy <characters|stories|music|tarot>"),
                }
            }
            "tab" => {
                if rest.is_empty() {
                    println!("Usage: tab <name>");
                } else {
                    session.run(Command::SwitchTab(rest.to_lowercase()));
                }
            }
            "layouts" => {
                let Some(tables) = session.controller.tables() else {
                    println!("Tables not loaded.");
                    continue;
                };
                let selected = session.controller.state().tarot_layout_index;
                for (index, layout) in tables.tarot_layouts().iter().enumerate() {
                    let marker = if index == selected { "*" } else { " " };
                    println!(
                        "{} {}: {} ({} cards)",
                        marker,
                        index,
                        layout.name,
                        layout.slots.len()
                    );
                }
            }
            "layout" => match rest.parse::<usize>() {
                Ok(index) => {
                    session.run(Command::SelectTarotLayout(index));
                    println!("Selected layout {}", session.controller.state().tarot_layout_index);
                }
                Err(_) => println!("Usage: layout <n>"),
            },
            "tarot" | "t" => session.run(Command::DrawTarot),
            "show" | "s" => session.show(rest),
            _ => println!("Unknown command: {}. Type 'help' for commands.", cmd),
        }
    }
}

struct Session {
    controller: Controller,
}

impl Session {
    // Errors were already shown through the renderer's notice.
    fn run(&mut self, command: Command) {
        let _ = self.controller.dispatch(command);
    }

    fn show(&self, what: &str) {
        if what.eq_ignore_ascii_case("tarot") {
            print_tarot(self.controller.tarot());
            return;
        }
        let categories: Vec<Category> = if what.is_empty() {
            Category::ALL.to_vec()
        } else {
            match Category::parse(what) {
                Some(category) => vec![category],
                None => {
                    println!("Usage: show [characters|stories|music|tarot]");
                    return;
                }
            }
        };
        for category in categories {
            print_record(
                category,
                self.controller.record(category),
                self.controller.locks(category),
            );
        }
        if what.is_empty() {
            print_tarot(self.controller.tarot());
        }
    }
}

fn print_record(category: Category, record: &GeneratedRecord, locks: &LockSet) {
    println!("== {} ==", category.as_str().to_uppercase());
    if record.is_empty() {
        println!("  (nothing generated yet)");
        return;
    }
    let mut current_section = None;
    for field in rendered_fields(category, record, locks) {
        if field.section != current_section {
            if let Some(title) = &field.section {
                println!("  [{}]", title);
            }
            current_section = field.section.clone();
        }
        let marker = if field.locked { "🔒" } else { "  " };
        let mut lines = field.value.lines();
        println!("  {} {}: {}", marker, field.name, lines.next().unwrap_or(""));
        for line in lines {
            println!("       {}", line);
        }
    }
    println!();
}

fn print_tarot(result: Option<&TarotResult>) {
    let Some(result) = result else {
        println!("== TAROT ==\n  (no cards drawn)\n");
        return;
    };
    println!("== TAROT: {} ==", result.layout_name);
    for card in &result.cards {
        let orientation = if card.is_reversed { " (Reversed)" } else { "" };
        println!("  [{}] {}{}", card.slot, card.name, orientation);
        println!("      {}: {}", card.keyword, card.meaning);
    }
    println!();
}

fn print_usage() {
    eprintln!("Usage: preview --tables <dir> [--state <dir>] [--seed <n>]");
    eprintln!();
    eprintln!("  --tables <dir>  Directory with character_elements, story_elements");
    eprintln!("                  and music_elements (.json or .ron)");
    eprintln!("  --state <dir>   Persist the session to <dir>/storySpinnerState.json");
    eprintln!("  --seed <n>      Seed the random source (default: OS entropy)");
}

fn print_help() {
    println!("Commands:");
    println!("  gen <category>            regenerate unlocked fields");
    println!("  lock <category> <field>   toggle a field's lock");
    println!("  copy <category|tarot>     print the export text");
    println!("  tab <name>                switch the active tab");
    println!("  layouts                   list tarot layouts");
    println!("  layout <n>                select a tarot layout");
    println!("  tarot                     draw the selected layout");
    println!("  show [category|tarot]     show the current session");
    println!("  help                      list commands");
    println!("  quit                      exit");
    println!();
    println!("Categories: characters, stories, music");
}
