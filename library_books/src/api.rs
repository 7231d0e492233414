use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Books are keyed by their ISBN
pub type BookId = String;

/// Stored in place of metadata an upstream API could not provide
pub const MISSING: &str = "missing";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Struct representing details of the book
pub struct BookDetails {
    pub id: BookId,
    pub title: String,
    /// All authors joined with " and "
    pub authors: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    pub publisher: String,
    pub published_date: String,
    pub genre: String,
    pub language: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Request to add a book, remaining details are looked up by ISBN
pub struct NewBookRequest {
    pub title: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    pub genre: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
/// Struct representing a patch to book details. Allows to specify only a few fields and patch the current details.
/// Only the fields listed here can be changed, a request naming any other field is rejected as a whole.
pub struct BookDetailsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl BookDetailsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
/// Query of GET /books, every given field has to match.
/// `language` matches books that list the given language.
pub struct BookFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(rename = "ISBN", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl BookFilter {
    pub fn by_isbn(isbn: &str) -> Self {
        Self {
            isbn: Some(isbn.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, book: &BookDetails) -> bool {
        fn field_matches(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().map_or(true, |expected| expected == actual)
        }

        field_matches(&self.id, &book.id)
            && field_matches(&self.title, &book.title)
            && field_matches(&self.authors, &book.authors)
            && field_matches(&self.isbn, &book.isbn)
            && field_matches(&self.publisher, &book.publisher)
            && field_matches(&self.published_date, &book.published_date)
            && field_matches(&self.genre, &book.genre)
            && field_matches(&self.summary, &book.summary)
            && self
                .language
                .as_ref()
                .map_or(true, |language| book.language.contains(language))
    }

    /// JSON document contained in every matching book document
    pub fn containment_document(&self) -> Value {
        let mut document = match json!(self) {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        if let Some(language) = document.remove("language") {
            document.insert("language".to_string(), json!([language]));
        }
        Value::Object(document)
    }
}
