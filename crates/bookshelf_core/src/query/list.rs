//! Search and sort for the library list screen.
//!
//! # Responsibility
//! - Derive an ordered display list from the full collection.
//! - Distinguish "library is empty" from "search matched nothing".
//!
//! # Invariants
//! - Input collection is never mutated; output is a fresh `Vec`.
//! - Sorting is stable: ties keep collection order.
//! - Title/author order uses root-locale collation at secondary strength:
//!   case is ignored, accents are not.
//! - Year order is descending; unspecified years (`0`) sort last.

use crate::model::book::BookRecord;
use icu_collator::{Collator, CollatorOptions, Strength};
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Ordering applied to the display list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Ascending by title, case-insensitive.
    #[default]
    Title,
    /// Ascending by author, case-insensitive.
    Author,
    /// Descending by year.
    Year,
}

impl SortKey {
    /// All keys in picker order.
    pub const ALL: [SortKey; 3] = [SortKey::Title, SortKey::Author, SortKey::Year];

    /// Picker label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Year => "Year",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
        }
    }
}

/// Sort key text that does not name a known key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl Display for UnknownSortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown sort key `{}`; expected title|author|year",
            self.0
        )
    }
}

impl Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "year" => Ok(Self::Year),
            other => Err(UnknownSortKey(other.to_string())),
        }
    }
}

/// Which list body the screen should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// The collection holds no books at all.
    EmptyLibrary,
    /// The collection has books but none match the search text.
    NoMatches,
    /// At least one book is displayed.
    Results,
}

/// Query result plus the context needed for empty-state rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryView {
    items: Vec<BookRecord>,
    total_count: usize,
    search_text: String,
    sort_key: SortKey,
}

impl LibraryView {
    /// Runs [`query`] and records the collection size alongside the result.
    pub fn build(records: &[BookRecord], search_text: &str, sort_key: SortKey) -> Self {
        Self {
            items: query(records, search_text, sort_key),
            total_count: records.len(),
            search_text: search_text.to_string(),
            sort_key,
        }
    }

    /// Books to display, in display order.
    pub fn items(&self) -> &[BookRecord] {
        &self.items
    }

    pub fn into_items(self) -> Vec<BookRecord> {
        self.items
    }

    /// Size of the unfiltered collection.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// `true` when the collection itself has zero records.
    pub fn is_library_empty(&self) -> bool {
        self.total_count == 0
    }

    /// `true` when the collection is non-empty but nothing matched.
    pub fn has_no_matches(&self) -> bool {
        self.total_count > 0 && self.items.is_empty()
    }

    pub fn state(&self) -> ListState {
        if self.is_library_empty() {
            ListState::EmptyLibrary
        } else if self.has_no_matches() {
            ListState::NoMatches
        } else {
            ListState::Results
        }
    }
}

/// Filters `records` by `search_text` and orders the result by `sort_key`.
///
/// # Contract
/// - Empty `search_text` keeps every record; otherwise a record is kept when
///   its title or author contains the text, ignoring case.
/// - The search text is used as typed (no trimming).
pub fn query(records: &[BookRecord], search_text: &str, sort_key: SortKey) -> Vec<BookRecord> {
    let mut items = if search_text.is_empty() {
        records.to_vec()
    } else {
        let needle = fold_case(search_text);
        records
            .iter()
            .filter(|record| matches_folded(record, &needle))
            .cloned()
            .collect::<Vec<_>>()
    };

    match sort_key {
        SortKey::Title => sort_by_text(&mut items, |record| record.title.as_str()),
        SortKey::Author => sort_by_text(&mut items, |record| record.author.as_str()),
        SortKey::Year => items.sort_by(|left, right| right.year.cmp(&left.year)),
    }

    items
}

/// Returns whether `record` matches `search_text`, ignoring case.
pub fn matches_search(record: &BookRecord, search_text: &str) -> bool {
    search_text.is_empty() || matches_folded(record, &fold_case(search_text))
}

fn matches_folded(record: &BookRecord, needle: &str) -> bool {
    fold_case(&record.title).contains(needle) || fold_case(&record.author).contains(needle)
}

fn sort_by_text(items: &mut [BookRecord], text: fn(&BookRecord) -> &str) {
    match case_insensitive_collator() {
        Ok(collator) => items.sort_by(|left, right| collator.compare(text(left), text(right))),
        Err(err) => {
            warn!(
                "event=library_query module=query status=degraded error_code=collator_unavailable error={err}"
            );
            items.sort_by_cached_key(|record| fold_case(text(record)));
        }
    }
}

fn case_insensitive_collator() -> Result<Collator, icu_collator::CollatorError> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    Collator::try_new(&Default::default(), options)
}

fn fold_case(value: &str) -> String {
    value.to_lowercase()
}
