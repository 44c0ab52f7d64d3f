//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical book record and the raw form input that produces it.
//! - Provide display helpers shared by list rows and detail screens.
//!
//! # Invariants
//! - `id` is stable, never nil, and never reused for another book.
//! - `year == 0` means "unspecified"; any other value is in `[1000, current year]`.
//! - Title and author are stored trimmed.

use crate::validation::validator::{
    current_year, validate, validate_at, AcceptedBook, BookField, FieldErrors, Validation,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a catalog entry.
pub type BookId = Uuid;

const YEAR_NOT_SPECIFIED: &str = "Not specified";

/// Record-level invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// Nil UUID cannot be used as a stable identity.
    NilId,
    /// One or more field rules failed.
    Fields(FieldErrors),
    /// Field value carries surrounding whitespace.
    NotTrimmed(BookField),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "book id must not be nil"),
            Self::Fields(errors) => write!(f, "{errors}"),
            Self::NotTrimmed(field) => {
                write!(f, "{} must not have surrounding whitespace", field.as_str())
            }
        }
    }
}

impl Error for BookValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fields(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for BookValidationError {
    fn from(value: FieldErrors) -> Self {
        Self::Fields(value)
    }
}

/// Canonical catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookRecordWire")]
pub struct BookRecord {
    id: BookId,
    /// Trimmed title, at least two characters.
    pub title: String,
    /// Trimmed author, at least two characters.
    pub author: String,
    /// Publication year, `0` when unspecified.
    pub year: i32,
}

#[derive(Deserialize)]
struct BookRecordWire {
    id: BookId,
    title: String,
    author: String,
    year: i32,
}

impl TryFrom<BookRecordWire> for BookRecord {
    type Error = BookValidationError;

    fn try_from(value: BookRecordWire) -> Result<Self, Self::Error> {
        let record = Self {
            id: value.id,
            title: value.title,
            author: value.author,
            year: value.year,
        };
        record.validate()?;
        Ok(record)
    }
}

impl BookRecord {
    /// Creates a record with a freshly generated id from accepted fields.
    pub fn new(fields: AcceptedBook) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            author: fields.author,
            year: fields.year,
        }
    }

    /// Creates a record with a caller-provided id.
    ///
    /// Used by storage read paths and imports where identity already exists.
    pub fn with_id(id: BookId, fields: AcceptedBook) -> Result<Self, BookValidationError> {
        if id.is_nil() {
            return Err(BookValidationError::NilId);
        }
        Ok(Self {
            id,
            title: fields.title,
            author: fields.author,
            year: fields.year,
        })
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    /// Replaces title, author and year together.
    pub fn apply(&mut self, fields: AcceptedBook) {
        self.title = fields.title;
        self.author = fields.author;
        self.year = fields.year;
    }

    /// Returns the year when one is specified.
    pub fn known_year(&self) -> Option<i32> {
        (self.year != 0).then_some(self.year)
    }

    /// Year as detail-screen text.
    pub fn display_year(&self) -> String {
        match self.known_year() {
            Some(year) => year.to_string(),
            None => YEAR_NOT_SPECIFIED.to_string(),
        }
    }

    /// Secondary line of a list row: author, then year when known.
    pub fn row_subtitle(&self) -> String {
        match self.known_year() {
            Some(year) => format!("{} \u{2022} {year}", self.author),
            None => self.author.clone(),
        }
    }

    /// Re-checks record invariants against the local calendar year.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        self.validate_at(current_year())
    }

    /// Re-checks record invariants against an explicit `current_year`.
    pub fn validate_at(&self, current_year: i32) -> Result<(), BookValidationError> {
        if self.id.is_nil() {
            return Err(BookValidationError::NilId);
        }

        let input = BookFormInput::from_record(self);
        let accepted = validate_at(&input.title, &input.author, &input.year, current_year)
            .into_result()?;
        if accepted.title != self.title {
            return Err(BookValidationError::NotTrimmed(BookField::Title));
        }
        if accepted.author != self.author {
            return Err(BookValidationError::NotTrimmed(BookField::Author));
        }
        Ok(())
    }
}

/// Raw form input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFormInput {
    pub title: String,
    pub author: String,
    /// Year text; empty when left blank.
    pub year: String,
}

impl BookFormInput {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.into(),
        }
    }

    /// Prefills an edit form from an existing record.
    ///
    /// An unspecified year becomes empty text, not `"0"`.
    pub fn from_record(record: &BookRecord) -> Self {
        Self {
            title: record.title.clone(),
            author: record.author.clone(),
            year: record
                .known_year()
                .map(|year| year.to_string())
                .unwrap_or_default(),
        }
    }

    /// Full validation against the local calendar year.
    pub fn validate(&self) -> Validation {
        validate(&self.title, &self.author, &self.year)
    }

    /// Submit-button gate; see [`crate::validation::validator::quick_check`].
    pub fn can_submit(&self) -> bool {
        crate::validation::validator::quick_check(&self.title, &self.author)
    }
}
