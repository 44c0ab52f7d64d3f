//! FFI use-case API for the Flutter library screens.
//!
//! # Responsibility
//! - Expose form validation, list queries and CRUD to Dart via FRB.
//! - Flatten core results into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every failure is reported in-band through `ok`/`message` fields.

use bookshelf_core::db::open_db;
use bookshelf_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    quick_check, BookField, BookFormInput, BookId, BookRecord, FieldErrors,
    LibraryError, LibraryService, LibraryView, ListState, SortKey, SqliteBookRepository,
    Validation,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const EMPTY_LIBRARY_MESSAGE: &str = "No Books Yet";
static LIBRARY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling log files.
/// - Idempotent for the same `level + log_dir`; conflicting calls fail.
/// - Returns empty string on success, error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Book as rendered by list rows and the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookItem {
    /// Stable book ID in string form.
    pub id: String,
    pub title: String,
    pub author: String,
    /// `0` when unspecified.
    pub year: i32,
    /// Row secondary line (`author • year`).
    pub subtitle: String,
    /// Detail-screen year text (`Not specified` for `0`).
    pub year_label: String,
}

/// Per-field validation outcome for the add/edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidationResponse {
    /// Whether the form would be accepted on submit.
    pub ok: bool,
    pub title_error: Option<String>,
    pub author_error: Option<String>,
    pub year_error: Option<String>,
}

impl FormValidationResponse {
    fn accepted() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    fn rejected(errors: &FieldErrors) -> Self {
        Self {
            ok: false,
            title_error: errors.message(BookField::Title),
            author_error: errors.message(BookField::Author),
            year_error: errors.message(BookField::Year),
        }
    }
}

/// List response for the library screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryListResponse {
    pub items: Vec<BookItem>,
    /// `empty_library`, `no_matches`, `results` or `error`.
    pub state: String,
    /// Size of the unfiltered library.
    pub total_count: u32,
    /// Applied sort key (`title|author|year`).
    pub sort: String,
    /// Empty-state headline or diagnostics text.
    pub message: String,
}

/// Result envelope for add/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookActionResponse {
    pub ok: bool,
    /// Affected book, when the action succeeded.
    pub book: Option<BookItem>,
    /// Field errors, when the form was rejected.
    pub validation: Option<FormValidationResponse>,
    /// Human-readable message for alerts.
    pub message: String,
}

impl BookActionResponse {
    fn success(message: impl Into<String>, book: &BookRecord) -> Self {
        Self {
            ok: true,
            book: Some(to_book_item(book)),
            validation: None,
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: LibraryError) -> Self {
        let validation = match &err {
            LibraryError::Rejected(errors) => Some(FormValidationResponse::rejected(errors)),
            _ => None,
        };
        Self {
            ok: false,
            book: None,
            validation,
            message: format!("{operation} failed: {err}"),
        }
    }

    fn failure_message(operation: &str, message: String) -> Self {
        Self {
            ok: false,
            book: None,
            validation: None,
            message: format!("{operation} failed: {message}"),
        }
    }
}

/// Full form validation, used on submit.
#[flutter_rust_bridge::frb(sync)]
pub fn book_form_validate(title: String, author: String, year: String) -> FormValidationResponse {
    match BookFormInput::new(title, author, year).validate() {
        Validation::Accepted(_) => FormValidationResponse::accepted(),
        Validation::Rejected(errors) => FormValidationResponse::rejected(&errors),
    }
}

/// Submit-button gate. Looser than [`book_form_validate`] on purpose.
#[flutter_rust_bridge::frb(sync)]
pub fn book_form_can_submit(title: String, author: String) -> bool {
    quick_check(title.as_str(), author.as_str())
}

/// Lists books filtered by `search` and ordered by `sort`.
///
/// Unknown `sort` values fall back to title order.
#[flutter_rust_bridge::frb(sync)]
pub fn library_list(search: String, sort: String) -> LibraryListResponse {
    let sort_key = sort.parse::<SortKey>().unwrap_or_default();
    match with_library(|service| Ok(service.view(search.as_str(), sort_key))) {
        Ok(view) => to_list_response(view),
        Err(message) => LibraryListResponse {
            items: Vec::new(),
            state: "error".to_string(),
            total_count: 0,
            sort: sort_key.as_str().to_string(),
            message: format!("library_list failed: {message}"),
        },
    }
}

/// Adds a book from raw form input.
#[flutter_rust_bridge::frb(sync)]
pub fn library_add(title: String, author: String, year: String) -> BookActionResponse {
    let input = BookFormInput::new(title, author, year);
    match with_library(|service| service.add_book(&input)) {
        Ok(book) => BookActionResponse::success(
            format!("'{}' has been added to your library.", book.title),
            &book,
        ),
        Err(err) => action_failure("library_add", err),
    }
}

/// Re-validates and replaces all fields of book `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn library_update(id: String, title: String, author: String, year: String) -> BookActionResponse {
    let book_id = match parse_book_id(&id) {
        Ok(book_id) => book_id,
        Err(message) => return BookActionResponse::failure_message("library_update", message),
    };
    let input = BookFormInput::new(title, author, year);
    match with_library(|service| service.update_book(book_id, &input)) {
        Ok(book) => BookActionResponse::success("Book updated.", &book),
        Err(err) => action_failure("library_update", err),
    }
}

/// Deletes book `id` permanently.
#[flutter_rust_bridge::frb(sync)]
pub fn library_delete(id: String) -> BookActionResponse {
    let book_id = match parse_book_id(&id) {
        Ok(book_id) => book_id,
        Err(message) => return BookActionResponse::failure_message("library_delete", message),
    };
    match with_library(|service| service.delete_book(book_id)) {
        Ok(book) => BookActionResponse::success("Book deleted.", &book),
        Err(err) => action_failure("library_delete", err),
    }
}

enum CallError {
    Setup(String),
    Library(LibraryError),
}

fn action_failure(operation: &str, err: CallError) -> BookActionResponse {
    match err {
        CallError::Setup(message) => BookActionResponse::failure_message(operation, message),
        CallError::Library(err) => {
            if matches!(err, LibraryError::Storage(_)) {
                warn!("event=ffi_call module=ffi status=error op={operation} error={err}");
            }
            BookActionResponse::failure(operation, err)
        }
    }
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(message) => write!(f, "{message}"),
            Self::Library(err) => write!(f, "{err}"),
        }
    }
}

fn resolve_library_db_path() -> PathBuf {
    LIBRARY_DB_PATH.get_or_init(default_library_db_path).clone()
}

#[cfg(not(test))]
fn default_library_db_path() -> PathBuf {
    bookshelf_core::CoreConfig::from_env().db_path
}

/// Unit tests write to a per-process file, never the user's library.
#[cfg(test)]
fn default_library_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("bookshelf-ffi-test-{}.sqlite3", std::process::id()))
}

fn with_library<T>(
    f: impl FnOnce(&mut LibraryService<SqliteBookRepository<'_>>) -> Result<T, LibraryError>,
) -> Result<T, CallError> {
    let db_path = resolve_library_db_path();
    let conn = open_db(&db_path)
        .map_err(|err| CallError::Setup(format!("library DB open failed: {err}")))?;
    let repo = SqliteBookRepository::try_new(&conn)
        .map_err(|err| CallError::Setup(format!("library repo init failed: {err}")))?;
    let mut service = LibraryService::open(repo)
        .map_err(|err| CallError::Setup(format!("library load failed: {err}")))?;
    f(&mut service).map_err(CallError::Library)
}

fn parse_book_id(raw: &str) -> Result<BookId, String> {
    BookId::parse_str(raw.trim()).map_err(|_| format!("invalid book id `{raw}`"))
}

fn to_list_response(view: LibraryView) -> LibraryListResponse {
    let (state, message) = match view.state() {
        ListState::EmptyLibrary => ("empty_library", EMPTY_LIBRARY_MESSAGE.to_string()),
        ListState::NoMatches => (
            "no_matches",
            format!("No Results for \u{201c}{}\u{201d}", view.search_text()),
        ),
        ListState::Results => ("results", format!("{} book(s).", view.items().len())),
    };
    let total_count = u32::try_from(view.total_count()).unwrap_or(u32::MAX);
    let sort = view.sort_key().as_str().to_string();

    LibraryListResponse {
        items: view.items().iter().map(to_book_item).collect(),
        state: state.to_string(),
        total_count,
        sort,
        message,
    }
}

fn to_book_item(book: &BookRecord) -> BookItem {
    BookItem {
        id: book.id().to_string(),
        title: book.title.clone(),
        author: book.author.clone(),
        year: book.year,
        subtitle: book.row_subtitle(),
        year_label: book.display_year(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        book_form_can_submit, book_form_validate, core_version, init_logging, library_add,
        library_delete, library_list, library_update, ping,
    };
    use bookshelf_core::db::open_db;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn form_validation_reports_field_messages() {
        let response = book_form_validate("A".to_string(), " ".to_string(), "abc".to_string());
        assert!(!response.ok);
        assert_eq!(
            response.title_error.as_deref(),
            Some("Title must be at least 2 characters")
        );
        assert_eq!(response.author_error.as_deref(), Some("Author is required"));
        assert_eq!(response.year_error.as_deref(), Some("Invalid year format"));
    }

    #[test]
    fn submit_gate_is_looser_than_validation() {
        assert!(book_form_can_submit("A".to_string(), "B".to_string()));
        assert!(!book_form_validate("A".to_string(), "B".to_string(), String::new()).ok);
    }

    #[test]
    fn add_then_list_finds_book_by_search() {
        let token = unique_token("ffi-add");
        let added = library_add(token.clone(), "Ffi Author".to_string(), "1999".to_string());
        assert!(added.ok, "{}", added.message);
        assert!(added.message.ends_with("has been added to your library."));
        let book = added.book.expect("added book should be returned");

        let listed = library_list(token, "year".to_string());
        assert_eq!(listed.state, "results");
        assert_eq!(listed.sort, "year");
        assert!(listed.items.iter().any(|item| item.id == book.id));
        assert_eq!(book.subtitle, "Ffi Author \u{2022} 1999");
    }

    #[test]
    fn list_reports_no_matches_for_unknown_search() {
        let added = library_add(
            unique_token("ffi-seed"),
            "Seed Author".to_string(),
            String::new(),
        );
        assert!(added.ok, "{}", added.message);

        let listed = library_list(unique_token("ffi-missing"), "bogus".to_string());
        assert_eq!(listed.state, "no_matches");
        assert_eq!(listed.sort, "title");
        assert!(listed.message.starts_with("No Results for"));
        assert!(listed.total_count > 0);
    }

    #[test]
    fn add_rejection_returns_field_errors() {
        let response = library_add("X".to_string(), "Some Author".to_string(), "999".to_string());
        assert!(!response.ok);
        let validation = response.validation.expect("validation details expected");
        assert!(validation.title_error.is_some());
        assert!(validation.year_error.is_some());
    }

    #[test]
    fn update_and_delete_roundtrip() {
        let added = library_add(
            unique_token("ffi-edit"),
            "Before Author".to_string(),
            String::new(),
        );
        let id = added.book.expect("added book").id;

        let updated = library_update(
            id.clone(),
            "Edited Title".to_string(),
            "After Author".to_string(),
            "2001".to_string(),
        );
        assert!(updated.ok, "{}", updated.message);

        let conn = open_db(super::resolve_library_db_path()).expect("open db");
        let (author, year): (String, i32) = conn
            .query_row(
                "SELECT author, year FROM books WHERE id = ?1",
                [id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("query book row");
        assert_eq!(author, "After Author");
        assert_eq!(year, 2001);

        let deleted = library_delete(id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        let again = library_delete(id);
        assert!(!again.ok);
        assert!(again.message.contains("not found"));
    }

    #[test]
    fn library_calls_use_isolated_database_file() {
        let path = super::resolve_library_db_path();
        assert_ne!(path, bookshelf_core::CoreConfig::default().db_path);
        assert_ne!(path, bookshelf_core::CoreConfig::from_env().db_path);
        let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        assert!(name.contains(&std::process::id().to_string()), "{name}");
    }

    #[test]
    fn malformed_id_is_reported_not_panicked() {
        let response = library_delete("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid book id"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
