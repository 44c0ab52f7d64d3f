//! Terminal shell over the Bookshelf core.
//!
//! # Responsibility
//! - Map subcommands onto `LibraryService` use-cases.
//! - Print the same user-facing messages as the mobile screens.

use bookshelf_core::db::open_db;
use bookshelf_core::logging::init_from_config;
use bookshelf_core::{
    BookField, BookFormInput, BookId, BookRecord, CoreConfig, LibraryError, LibraryService,
    ListState, SortKey, SqliteBookRepository,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "bookshelf", version, about = "Personal library catalog")]
struct Cli {
    /// SQLite database file (overrides BOOKSHELF_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log level (overrides BOOKSHELF_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute log directory (overrides BOOKSHELF_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a book.
    Add(AddArgs),
    /// List books, optionally filtered and sorted.
    List(ListArgs),
    /// Show one book.
    Show { id: String },
    /// Edit a book; omitted fields keep their current value.
    Edit(EditArgs),
    /// Delete a book permanently.
    Delete { id: String },
    /// Print core linkage info.
    Ping,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    /// Publication year; leave out when unknown.
    #[arg(long, default_value = "")]
    year: String,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value = "")]
    search: String,
    /// title | author | year
    #[arg(long, default_value = "title")]
    sort: SortKey,
}

#[derive(Args, Debug)]
struct EditArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    /// New year text; pass an empty string to clear it.
    #[arg(long)]
    year: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli);
    init_from_config(&config)?;

    if let Commands::Ping = cli.command {
        println!("bookshelf_core ping={}", bookshelf_core::ping());
        println!("bookshelf_core version={}", bookshelf_core::core_version());
        return Ok(());
    }

    let conn = open_db(&config.db_path)
        .map_err(|err| format!("failed to open `{}`: {err}", config.db_path.display()))?;
    let repo = SqliteBookRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let mut service = LibraryService::open(repo).map_err(|err| err.to_string())?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match cli.command {
        Commands::Add(args) => {
            let input = BookFormInput::new(args.title, args.author, args.year);
            if !input.can_submit() {
                return Err("Title and author are required.".to_string());
            }
            let book = service.add_book(&input).map_err(describe)?;
            println!("'{}' has been added to your library.", book.title);
            println!("id: {}", book.id());
        }
        Commands::List(args) => {
            let view = service.view(&args.search, args.sort);
            match view.state() {
                ListState::EmptyLibrary => {
                    println!("No Books Yet");
                    println!("Add your first book with `bookshelf add`.");
                }
                ListState::NoMatches => {
                    println!("No Results for \u{201c}{}\u{201d}", view.search_text());
                }
                ListState::Results => view.items().iter().for_each(print_row),
            }
        }
        Commands::Show { id } => {
            let id = parse_id(&id)?;
            let book = service
                .get(id)
                .ok_or_else(|| format!("book not found: {id}"))?;
            print_detail(book);
        }
        Commands::Edit(args) => {
            let id = parse_id(&args.id)?;
            let current = service
                .get(id)
                .ok_or_else(|| format!("book not found: {id}"))?;
            let mut input = BookFormInput::from_record(current);
            if let Some(title) = args.title {
                input.title = title;
            }
            if let Some(author) = args.author {
                input.author = author;
            }
            if let Some(year) = args.year {
                input.year = year;
            }
            if !input.can_submit() {
                return Err("Title and author are required.".to_string());
            }
            let book = service.update_book(id, &input).map_err(describe)?;
            print_detail(&book);
        }
        Commands::Delete { id } => {
            let id = parse_id(&id)?;
            let book = service.delete_book(id).map_err(describe)?;
            println!("Deleted '{}'.", book.title);
        }
        Commands::Ping => {}
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> CoreConfig {
    let mut config = CoreConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Add(_) => "add",
        Commands::List(_) => "list",
        Commands::Show { .. } => "show",
        Commands::Edit(_) => "edit",
        Commands::Delete { .. } => "delete",
        Commands::Ping => "ping",
    }
}

fn parse_id(raw: &str) -> Result<BookId, String> {
    BookId::parse_str(raw.trim()).map_err(|_| format!("invalid book id `{raw}`"))
}

/// Renders field errors one per line, like inline form messages.
fn describe(err: LibraryError) -> String {
    match err {
        LibraryError::Rejected(errors) => [BookField::Title, BookField::Author, BookField::Year]
            .into_iter()
            .filter_map(|field| {
                errors
                    .message(field)
                    .map(|message| format!("{}: {message}", field.as_str()))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn print_row(book: &BookRecord) {
    println!("{}", book.title);
    println!("  {}  [{}]", book.row_subtitle(), book.id());
}

fn print_detail(book: &BookRecord) {
    println!("Title:  {}", book.title);
    println!("Author: {}", book.author);
    println!("Year:   {}", book.display_year());
    println!("Id:     {}", book.id());
}
