use bookshelf_core::db::schema::SCHEMA_VERSION;
use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    AcceptedBook, BookRecord, BookRepository, InMemoryBookRepository, RepoError,
    SqliteBookRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn book(title: &str, author: &str, year: i32) -> BookRecord {
    BookRecord::new(AcceptedBook {
        title: title.to_string(),
        author: author.to_string(),
        year,
    })
}

fn book_with_fixed_id(id: &str, title: &str) -> BookRecord {
    BookRecord::with_id(
        Uuid::parse_str(id).unwrap(),
        AcceptedBook {
            title: title.to_string(),
            author: "Some Author".to_string(),
            year: 0,
        },
    )
    .unwrap()
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let record = book("1984", "George Orwell", 1949);
    let id = repo.insert(&record).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn update_replaces_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let mut record = book("Emma", "Jane Austen", 1815);
    repo.insert(&record).unwrap();

    record.title = "Persuasion".to_string();
    record.author = "J. Austen".to_string();
    record.year = 0;
    repo.update(&record).unwrap();

    let loaded = repo.get(record.id()).unwrap().unwrap();
    assert_eq!(loaded.title, "Persuasion");
    assert_eq!(loaded.author, "J. Austen");
    assert_eq!(loaded.year, 0);
}

#[test]
fn update_and_delete_missing_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let record = book("Missing", "Nobody Home", 0);
    let update_err = repo.update(&record).unwrap_err();
    assert!(matches!(update_err, RepoError::NotFound(id) if id == record.id()));

    let delete_err = repo.delete(record.id()).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(id) if id == record.id()));
}

#[test]
fn delete_is_permanent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let record = book("Dune", "Frank Herbert", 1965);
    repo.insert(&record).unwrap();
    repo.delete(record.id()).unwrap();

    assert!(repo.get(record.id()).unwrap().is_none());
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn duplicate_id_insert_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let record = book("Emma", "Jane Austen", 1815);
    repo.insert(&record).unwrap();

    let err = repo.insert(&record).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateId(id) if id == record.id()));
}

#[test]
fn invalid_records_are_not_written() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let mut record = book("Emma", "Jane Austen", 1815);
    record.year = 999;
    let create_err = repo.insert(&record).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    record.year = 1815;
    repo.insert(&record).unwrap();
    record.title = " ".to_string();
    let update_err = repo.update(&record).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
}

#[test]
fn load_all_returns_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let record_c = book_with_fixed_id("00000000-0000-4000-8000-000000000003", "c book");
    let record_a = book_with_fixed_id("00000000-0000-4000-8000-000000000001", "a book");
    let record_b = book_with_fixed_id("00000000-0000-4000-8000-000000000002", "b book");
    repo.insert(&record_c).unwrap();
    repo.insert(&record_a).unwrap();
    repo.insert(&record_b).unwrap();

    conn.execute("UPDATE books SET created_at = 1234567890000;", [])
        .unwrap();

    let ids = repo
        .load_all()
        .unwrap()
        .into_iter()
        .map(|record| record.id())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![record_c.id(), record_a.id(), record_b.id()]);
}

#[test]
fn load_all_rejects_corrupted_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO books (id, title, author, year) VALUES ('not-a-uuid', 'Emma', 'Austen', 0);",
        [],
    )
    .unwrap();

    let err = repo.load_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn load_all_rejects_rows_breaking_field_rules() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO books (id, title, author, year)
         VALUES ('00000000-0000-4000-8000-000000000009', 'E', 'Austen', 0);",
        [],
    )
    .unwrap();

    let err = repo.load_all().unwrap_err();
    assert!(err.to_string().contains("Title must be at least 2 characters"));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBookRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, SCHEMA_VERSION),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_books_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
        .unwrap();

    let result = SqliteBookRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("books"))));
}

#[test]
fn repository_rejects_connection_missing_books_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE books (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            author TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
        .unwrap();

    let result = SqliteBookRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "books",
            column: "year"
        })
    ));
}

#[test]
fn in_memory_repository_matches_sqlite_semantics() {
    let repo = InMemoryBookRepository::new();
    let mut record = book("Emma", "Jane Austen", 1815);

    repo.insert(&record).unwrap();
    assert!(matches!(
        repo.insert(&record),
        Err(RepoError::DuplicateId(_))
    ));

    record.year = 1816;
    repo.update(&record).unwrap();
    assert_eq!(repo.get(record.id()).unwrap().unwrap().year, 1816);

    repo.delete(record.id()).unwrap();
    assert!(repo.is_empty());
    assert!(matches!(
        repo.delete(record.id()),
        Err(RepoError::NotFound(_))
    ));
}
