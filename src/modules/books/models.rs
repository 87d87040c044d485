use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::error::BookError;

/// A book on the shelf, as returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Server-generated identifier, never changes
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    /// Derived when the book is added: every page had been read
    pub finished: bool,
    pub reading: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    pub(crate) fn new(id: String, fields: BookFields, now: OffsetDateTime) -> Self {
        Self {
            id,
            finished: fields.read_page == fields.page_count,
            name: fields.name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            reading: fields.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the caller-owned fields. `finished` keeps the value computed
    /// when the book was added.
    pub(crate) fn apply(&mut self, fields: BookFields, now: OffsetDateTime) {
        self.name = fields.name;
        self.year = fields.year;
        self.author = fields.author;
        self.summary = fields.summary;
        self.publisher = fields.publisher;
        self.page_count = fields.page_count;
        self.read_page = fields.read_page;
        self.reading = fields.reading;
        self.updated_at = now;
    }

    pub fn to_summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Projection returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

/// Request body for adding or updating a book.
///
/// Page counts and `reading` fall back to their defaults when absent or `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read_page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reading: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A payload that passed validation.
#[derive(Debug, Clone)]
pub(crate) struct BookFields {
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl TryFrom<BookPayload> for BookFields {
    type Error = BookError;

    fn try_from(payload: BookPayload) -> Result<Self, Self::Error> {
        let name = match payload.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(BookError::MissingField("name")),
        };

        if payload.read_page > payload.page_count {
            return Err(BookError::InvalidRange {
                read_page: payload.read_page,
                page_count: payload.page_count,
            });
        }

        Ok(Self {
            name,
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count: payload.page_count,
            read_page: payload.read_page,
            reading: payload.reading,
        })
    }
}

/// Raw query string of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub reading: Option<String>,
    pub finished: Option<String>,
}

/// The single filter applied by a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    Reading(bool),
    Finished(bool),
    /// Case-insensitive substring of the name
    Name(String),
    All,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::Reading(reading) => book.reading == *reading,
            BookFilter::Finished(finished) => book.finished == *finished,
            BookFilter::Name(needle) => book.name.to_lowercase().contains(needle),
            BookFilter::All => true,
        }
    }
}

impl From<ListQuery> for BookFilter {
    /// `reading` beats `finished`, which beats `name`. Flags that are empty or
    /// not boolean-like are ignored.
    fn from(query: ListQuery) -> Self {
        if let Some(reading) = query.reading.as_deref().and_then(parse_flag) {
            return BookFilter::Reading(reading);
        }
        if let Some(finished) = query.finished.as_deref().and_then(parse_flag) {
            return BookFilter::Finished(finished);
        }
        match query.name {
            Some(name) if !name.is_empty() => BookFilter::Name(name.to_lowercase()),
            _ => BookFilter::All,
        }
    }
}

/// `true`/`1` and `false`/`0`, ignoring case and surrounding whitespace.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
