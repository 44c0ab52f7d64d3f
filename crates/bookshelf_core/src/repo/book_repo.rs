//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `books` table.
//! - Reject connections whose schema is not ready for use.
//!
//! # Invariants
//! - `load_all` returns books in insertion order.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Delete is a hard delete.

use crate::db::schema::{stored_schema_version, SCHEMA_VERSION};
use crate::db::DbError;
use crate::model::book::{BookId, BookRecord, BookValidationError};
use crate::validation::validator::AcceptedBook;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const BOOK_SELECT_SQL: &str = "SELECT id, title, author, year FROM books";
const REQUIRED_BOOK_COLUMNS: &[&str] = &["id", "title", "author", "year", "created_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for book persistence and lookup.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Db(DbError),
    NotFound(BookId),
    /// Another record already uses this id.
    DuplicateId(BookId),
    InvalidData(String),
    /// Connection was not bootstrapped through `open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::DuplicateId(id) => write!(f, "book id already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence interface the service depends on.
pub trait BookRepository {
    /// Stores a new book and returns its id.
    fn insert(&self, book: &BookRecord) -> RepoResult<BookId>;
    /// Replaces title, author and year of an existing book.
    fn update(&self, book: &BookRecord) -> RepoResult<()>;
    /// Removes a book permanently.
    fn delete(&self, id: BookId) -> RepoResult<()>;
    fn get(&self, id: BookId) -> RepoResult<Option<BookRecord>>;
    /// Returns every stored book in insertion order.
    fn load_all(&self) -> RepoResult<Vec<BookRecord>>;
}

impl<R: BookRepository + ?Sized> BookRepository for &R {
    fn insert(&self, book: &BookRecord) -> RepoResult<BookId> {
        (**self).insert(book)
    }

    fn update(&self, book: &BookRecord) -> RepoResult<()> {
        (**self).update(book)
    }

    fn delete(&self, id: BookId) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn get(&self, id: BookId) -> RepoResult<Option<BookRecord>> {
        (**self).get(id)
    }

    fn load_all(&self) -> RepoResult<Vec<BookRecord>> {
        (**self).load_all()
    }
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is behind.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn insert(&self, book: &BookRecord) -> RepoResult<BookId> {
        book.validate()?;

        self.conn
            .execute(
                "INSERT INTO books (id, title, author, year) VALUES (?1, ?2, ?3, ?4);",
                params![
                    book.id().to_string(),
                    book.title.as_str(),
                    book.author.as_str(),
                    book.year,
                ],
            )
            .map_err(|err| map_insert_error(err, book.id()))?;

        Ok(book.id())
    }

    fn update(&self, book: &BookRecord) -> RepoResult<()> {
        book.validate()?;

        let changed = self.conn.execute(
            "UPDATE books
             SET
                title = ?1,
                author = ?2,
                year = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                book.title.as_str(),
                book.author.as_str(),
                book.year,
                book.id().to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(book.id()));
        }
        Ok(())
    }

    fn delete(&self, id: BookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get(&self, id: BookId) -> RepoResult<Option<BookRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_book_row(row)?)),
            None => Ok(None),
        }
    }

    fn load_all(&self) -> RepoResult<Vec<BookRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = SCHEMA_VERSION;
    let actual_version = stored_schema_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'books');",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("books"));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('books');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_BOOK_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "books",
                column,
            });
        }
    }

    Ok(())
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<BookRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{id_text}` in books.id")))?;

    let fields = AcceptedBook {
        title: row.get("title")?,
        author: row.get("author")?,
        year: row.get("year")?,
    };
    let book = BookRecord::with_id(id, fields)
        .map_err(|err| RepoError::InvalidData(format!("book {id_text}: {err}")))?;
    book.validate()
        .map_err(|err| RepoError::InvalidData(format!("book {id_text}: {err}")))?;
    Ok(book)
}

fn map_insert_error(err: rusqlite::Error, id: BookId) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            return RepoError::DuplicateId(id);
        }
    }
    RepoError::Db(DbError::Sqlite(err))
}
