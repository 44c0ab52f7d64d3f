//! Field rules for book title, author and publication year.
//!
//! # Responsibility
//! - Trim and check title/author, parse and range-check year text.
//! - Collect every applicable field error in one pass.
//!
//! # Invariants
//! - `Validation` is either accepted or rejected, never both.
//! - At most one error is reported per field.
//! - Empty year text resolves to the `0` sentinel without error.

use chrono::Datelike;
use std::error::Error;
use std::fmt::{Display, Formatter};
use unicode_segmentation::UnicodeSegmentation;

/// Minimum trimmed character count for title and author.
pub const MIN_NAME_CHARS: usize = 2;
/// Earliest accepted publication year.
pub const MIN_YEAR: i32 = 1000;

/// Form field addressed by a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BookField {
    Title,
    Author,
    Year,
}

impl BookField {
    /// Stable lowercase name, used as map key by FFI callers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
        }
    }
}

/// User-correctable error for a single form field.
///
/// `Display` renders the exact message shown inline under the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    TitleRequired,
    TitleTooShort,
    AuthorRequired,
    AuthorTooShort,
    /// Year text is non-empty but not an integer.
    InvalidYearFormat,
    /// Year parsed but lies outside `[MIN_YEAR, current_year]`.
    YearOutOfRange { current_year: i32 },
}

impl FieldValidationError {
    /// Returns the field this error belongs to.
    pub fn field(&self) -> BookField {
        match self {
            Self::TitleRequired | Self::TitleTooShort => BookField::Title,
            Self::AuthorRequired | Self::AuthorTooShort => BookField::Author,
            Self::InvalidYearFormat | Self::YearOutOfRange { .. } => BookField::Year,
        }
    }
}

impl Display for FieldValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleRequired => write!(f, "Title is required"),
            Self::TitleTooShort => {
                write!(f, "Title must be at least {MIN_NAME_CHARS} characters")
            }
            Self::AuthorRequired => write!(f, "Author is required"),
            Self::AuthorTooShort => {
                write!(f, "Author name must be at least {MIN_NAME_CHARS} characters")
            }
            Self::InvalidYearFormat => write!(f, "Invalid year format"),
            Self::YearOutOfRange { current_year } => {
                write!(f, "Year must be between {MIN_YEAR} and {current_year}")
            }
        }
    }
}

impl Error for FieldValidationError {}

/// All field errors collected from one validation pass.
///
/// Errors are kept in form order: title, author, year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the error reported for `field`, if any.
    pub fn get(&self, field: BookField) -> Option<&FieldValidationError> {
        self.errors.iter().find(|err| err.field() == field)
    }

    /// Returns the inline message for `field`, if any.
    pub fn message(&self, field: BookField) -> Option<String> {
        self.get(field).map(ToString::to_string)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldValidationError> {
        self.errors.iter()
    }

    fn push(&mut self, error: FieldValidationError) {
        self.errors.push(error);
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        write!(f, "{}", messages.join("; "))
    }
}

impl Error for FieldErrors {}

/// Normalized field values ready to become a `BookRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedBook {
    /// Trimmed title.
    pub title: String,
    /// Trimmed author.
    pub author: String,
    /// Publication year, `0` when unspecified.
    pub year: i32,
}

/// Outcome of full form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted(AcceptedBook),
    Rejected(FieldErrors),
}

impl Validation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Converts into a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<AcceptedBook, FieldErrors> {
        match self {
            Self::Accepted(book) => Ok(book),
            Self::Rejected(errors) => Err(errors),
        }
    }
}

/// Validates raw form input against the local calendar year.
pub fn validate(title: &str, author: &str, year_text: &str) -> Validation {
    validate_at(title, author, year_text, current_year())
}

/// Validates raw form input against an explicit `current_year`.
///
/// # Contract
/// - Title and author are trimmed before evaluation.
/// - Year text is parsed as-is; empty text means "unspecified" (`0`).
/// - Every field is checked; all errors are returned together.
pub fn validate_at(title: &str, author: &str, year_text: &str, current_year: i32) -> Validation {
    let mut errors = FieldErrors::default();

    let title = check_name(
        title,
        FieldValidationError::TitleRequired,
        FieldValidationError::TitleTooShort,
    )
    .map_err(|err| errors.push(err))
    .ok();
    let author = check_name(
        author,
        FieldValidationError::AuthorRequired,
        FieldValidationError::AuthorTooShort,
    )
    .map_err(|err| errors.push(err))
    .ok();
    let year = check_year(year_text, current_year)
        .map_err(|err| errors.push(err))
        .ok();

    match (title, author, year) {
        (Some(title), Some(author), Some(year)) => {
            Validation::Accepted(AcceptedBook { title, author, year })
        }
        _ => Validation::Rejected(errors),
    }
}

/// Lightweight submit gate: trimmed title and author are non-empty.
///
/// Intentionally looser than [`validate`]; a one-character title passes here
/// and is rejected on submit.
pub fn quick_check(title: &str, author: &str) -> bool {
    !title.trim().is_empty() && !author.trim().is_empty()
}

/// Returns the local calendar year.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

fn check_name(
    raw: &str,
    required: FieldValidationError,
    too_short: FieldValidationError,
) -> Result<String, FieldValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(required);
    }
    if trimmed.graphemes(true).count() < MIN_NAME_CHARS {
        return Err(too_short);
    }
    Ok(trimmed.to_string())
}

fn check_year(raw: &str, current_year: i32) -> Result<i32, FieldValidationError> {
    if raw.is_empty() {
        return Ok(0);
    }

    let year = raw
        .parse::<i64>()
        .map_err(|_| FieldValidationError::InvalidYearFormat)?;
    if year < i64::from(MIN_YEAR) || year > i64::from(current_year) {
        return Err(FieldValidationError::YearOutOfRange { current_year });
    }

    // In range of [MIN_YEAR, current_year], so the narrowing cannot fail.
    i32::try_from(year).map_err(|_| FieldValidationError::YearOutOfRange { current_year })
}
