//! Pocket Notes: named plain-text notes kept one file each in a directory,
//! with a name mapping stored beside them and an undoable editor.
//!
//! - `edit_log`: undo/redo history over a text buffer
//! - `session`: the note open in the editor, dirty tracking and saving
//! - `registry`: the sorted list of notes and its file operations
//! - `storage`: note files and the name mapping on disk
//! - `command`: actions dispatched against the application state
//! - `config`: environment driven settings

pub mod args;
pub mod command;
pub mod config;
pub mod edit_log;
pub mod error;
pub mod formatting;
pub mod note;
pub mod registry;
pub mod session;
pub mod shared;
pub mod storage;

pub use command::{Action, App, Effect, Prompter};
pub use config::Config;
pub use edit_log::{Edit, EditKind, EditLog, Editor, HistoryState, StringBuffer, TextBuffer};
pub use error::{NoteError, Result};
pub use note::NoteRecord;
pub use registry::NoteRegistry;
pub use session::{CloseChoice, DocumentSession};
pub use storage::{FsNoteStore, MetadataLoad, MetadataStore, NoteStore, TomlMetadataStore};

use args::ArgParser;
use formatting::FormatContext;
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliApp = App<FsNoteStore, TomlMetadataStore>;

pub fn entry() -> std::result::Result<(), Box<dyn Error>> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_help();
        return Ok(());
    }

    let cmd = args.remove(0);
    if matches!(cmd.as_str(), "help" | "-h" | "--help") {
        print_help();
        return Ok(());
    }
    let config = Config::from_env()?;
    init_logging(&config);
    config.ensure_dirs()?;
    let mut app = App::load(
        FsNoteStore::new(config.notes_dir()),
        TomlMetadataStore::new(config.data_file()),
    )?;

    match cmd.as_str() {
        "list" => list_notes(args, &app, &config)?,
        "show" => show_note(args, &app)?,
        "write" => write_note(args, &mut app)?,
        "rename" => rename_note(args, &mut app)?,
        "delete" => delete_note(args, &mut app)?,
        "edit" => edit_note(args, &mut app)?,
        "path" => println!("{}", config.app_dir.display()),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        "\
Pocket Notes
Usage:
  pn list                         List notes by name with modification time
  pn show <name>                  Print a note
  pn write <name> [text...]       Create or overwrite a note (reads stdin without text)
  pn rename <old> <new> [--force] Rename a note (--force replaces an existing <new>)
  pn delete <name> --yes          Delete a note
  pn edit <name>                  Edit in $EDITOR (creates the note when missing)
  pn path                         Show the application directory
  pn help                         Show this message

Environment:
  POCKET_NOTES_DIR                Override the application directory (default: ~/.pocket_notes)
  POCKET_NOTES_LOG                Log filter for stderr diagnostics, e.g. debug
  NO_COLOR                        Disable colored output
"
    );
}

/// Logging stays off unless `POCKET_NOTES_LOG` is set.
fn init_logging(config: &Config) {
    let Some(filter) = config.log_filter.as_deref() else {
        return;
    };
    let env_filter = EnvFilter::new(format!("pocket_notes={filter}"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(io::stderr)
        .try_init();
    info!("logging initialized");
}

/// Answers prompts from command-line switches; nothing is interactive.
struct FlagPrompter {
    force: bool,
    yes: bool,
}

impl Prompter for FlagPrompter {
    fn confirm_close(&mut self) -> CloseChoice {
        CloseChoice::Cancel
    }

    fn confirm_overwrite(&mut self, _name: &str) -> bool {
        self.force
    }

    fn confirm_delete(&mut self, _name: &str) -> bool {
        self.yes
    }
}

/// Run `actions` in order, stopping at the first message, which becomes
/// the error. Returns whether the list changed.
fn run(
    app: &mut CliApp,
    prompter: &mut FlagPrompter,
    actions: Vec<Action>,
) -> std::result::Result<bool, Box<dyn Error>> {
    let mut changed = false;
    for action in actions {
        for effect in app.dispatch(action, prompter)? {
            match effect {
                Effect::Message(msg) => return Err(msg.into()),
                Effect::ListChanged => changed = true,
                _ => {}
            }
        }
    }
    Ok(changed)
}

fn open_or_new(app: &CliApp, name: &str) -> Vec<Action> {
    if app.registry().contains(name) {
        vec![Action::Open(name.to_string())]
    } else {
        vec![Action::New, Action::SetName(name.to_string())]
    }
}

fn list_notes(
    args: Vec<String>,
    app: &CliApp,
    config: &Config,
) -> std::result::Result<(), Box<dyn Error>> {
    ArgParser::new(args, "list").positionals(0, &[], "pn list")?;
    if app.registry().is_empty() {
        println!("No notes yet. Try `pn write <name> \"text\"`.");
        return Ok(());
    }
    let ctx = FormatContext::new(config.color);
    let rows: Vec<(String, String)> = app
        .registry()
        .records()
        .iter()
        .map(|r| {
            (
                ctx.format_name(r.name()),
                ctx.format_timestamp(r.modified.as_deref().unwrap_or("-")),
            )
        })
        .collect();
    let width = terminal_size::terminal_size().map(|(w, _)| w.0 as usize);
    let headers = (ctx.format_header("Note"), ctx.format_header("Modified"));
    println!(
        "{}",
        shared::table::render_list(
            (headers.0.as_str(), headers.1.as_str()),
            &rows,
            width,
        )
    );
    Ok(())
}

fn show_note(
    args: Vec<String>,
    app: &CliApp,
) -> std::result::Result<(), Box<dyn Error>> {
    let (pos, _) =
        ArgParser::new(args, "show").positionals(1, &[], "pn show <name>")?;
    print!("{}", app.registry().get(&pos[0])?);
    Ok(())
}

fn write_note(
    args: Vec<String>,
    app: &mut CliApp,
) -> std::result::Result<(), Box<dyn Error>> {
    let (mut pos, _) = ArgParser::new(args, "write").split(&[])?;
    if pos.is_empty() {
        return Err("Usage: pn write <name> [text...]".into());
    }
    let name = pos.remove(0);
    let content = if pos.is_empty() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        pos.join(" ")
    };

    let mut actions = open_or_new(app, &name);
    actions.push(Action::ReplaceText(content));
    actions.push(Action::Save);
    let mut prompter = FlagPrompter { force: false, yes: false };
    run(app, &mut prompter, actions)?;
    app.persist()?;
    println!("Saved {name}");
    Ok(())
}

fn rename_note(
    args: Vec<String>,
    app: &mut CliApp,
) -> std::result::Result<(), Box<dyn Error>> {
    let (pos, flags) = ArgParser::new(args, "rename").positionals(
        2,
        &["--force"],
        "pn rename <old> <new> [--force]",
    )?;
    let (old, new) = (&pos[0], &pos[1]);
    if !app.registry().contains(old) {
        return Err(NoteError::not_found(old).into());
    }
    let mut prompter =
        FlagPrompter { force: flags.iter().any(|f| f == "--force"), yes: false };
    let changed = run(
        app,
        &mut prompter,
        vec![Action::Open(old.clone()), Action::SetName(new.clone()), Action::Save],
    )?;
    if !changed {
        return Err(format!(
            "A note named '{new}' already exists; pass --force to replace it"
        )
        .into());
    }
    app.persist()?;
    println!("Renamed {old} -> {new}");
    Ok(())
}

fn delete_note(
    args: Vec<String>,
    app: &mut CliApp,
) -> std::result::Result<(), Box<dyn Error>> {
    let (pos, flags) = ArgParser::new(args, "delete").positionals(
        1,
        &["--yes"],
        "pn delete <name> --yes",
    )?;
    let name = &pos[0];
    let mut prompter =
        FlagPrompter { force: false, yes: flags.iter().any(|f| f == "--yes") };
    let changed =
        run(app, &mut prompter, vec![Action::DeleteNote(name.clone())])?;
    if !changed {
        return Err(format!("Not deleted; pass --yes to delete {name}").into());
    }
    app.persist()?;
    println!("Deleted {name}");
    Ok(())
}

fn edit_note(
    args: Vec<String>,
    app: &mut CliApp,
) -> std::result::Result<(), Box<dyn Error>> {
    let (pos, _) =
        ArgParser::new(args, "edit").positionals(1, &[], "pn edit <name>")?;
    let name = &pos[0];
    let mut prompter = FlagPrompter { force: false, yes: false };
    let opening = open_or_new(app, name);
    run(app, &mut prompter, opening)?;

    let scratch = tempfile::Builder::new().prefix("pn-edit-").tempfile()?;
    fs::write(scratch.path(), app.text())?;
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor)
        .arg(scratch.path())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    if !status.success() {
        return Err("Editor exited with non-zero status".into());
    }
    let edited = fs::read_to_string(scratch.path())?;

    run(app, &mut prompter, vec![Action::ReplaceText(edited), Action::Save])?;
    app.persist()?;
    println!("Updated {name}");
    Ok(())
}
