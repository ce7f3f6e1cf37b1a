use bson::{doc, Document};
use regex::{Regex, RegexBuilder};

/// Case-insensitive substring match over a fixed set of fields.
/// The term is escaped, so user input never acts as a pattern.
#[derive(Debug, Clone)]
pub struct TextQuery {
    term: String,
    matcher: Regex,
}

impl TextQuery {
    /// `None` for a blank term.
    pub fn new(raw: &str) -> Option<Self> {
        let term = raw.trim();
        if term.is_empty() {
            return None;
        }
        let matcher = RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build().ok()?;
        Some(TextQuery { term: term.to_string(), matcher })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// `$or` of one `$regex` clause per field.
    pub fn any_field(&self, fields: &[&str]) -> Document {
        let pattern = regex::escape(&self.term);
        let clauses: Vec<Document> = fields
            .iter()
            .map(|field| doc! { *field: { "$regex": pattern.as_str(), "$options": "i" } })
            .collect();
        doc! { "$or": clauses }
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.matcher.is_match(haystack)
    }
}
