//! Stored DOCX documents shared by templates, quotations and invoices.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, string_enum};

/// File persisted by the storage layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    /// Path relative to the configured upload directory.
    pub path: String,
    /// Original or generated file name shown to users.
    pub name: String,
    /// Size in bytes.
    pub size: i32,
}

impl StoredFile {
    pub fn from_parts(
        path: Option<String>,
        name: Option<String>,
        size: Option<i32>,
    ) -> Option<Self> {
        match (path, name) {
            (Some(path), Some(name)) => Some(Self {
                path,
                name,
                size: size.unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

string_enum!(
    /// Kind of document that can be opened in the external editor.
    DocumentKind {
        Template => "template",
        Quotation => "quotation",
        Invoice => "invoice",
    }
);

/// Prefix used for numbered documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberPrefix {
    Quotation,
    Invoice,
}

impl NumberPrefix {
    const fn as_str(self) -> &'static str {
        match self {
            NumberPrefix::Quotation => "Q",
            NumberPrefix::Invoice => "INV",
        }
    }

    /// Prefix of every number issued in the year of `today`, e.g. `Q-2025-`.
    pub fn for_year(self, today: NaiveDate) -> String {
        format!("{}-{}-", self.as_str(), today.year())
    }
}

/// Computes the number following `latest` within the year of `today`.
///
/// Numbers look like `Q-2025-0001`; the sequence restarts every year.
pub fn next_document_number(
    prefix: NumberPrefix,
    today: NaiveDate,
    latest: Option<&str>,
) -> Result<String, TypeConstraintError> {
    let year_prefix = prefix.for_year(today);
    let next = match latest {
        Some(number) => {
            let sequence = number
                .strip_prefix(&year_prefix)
                .and_then(|rest| rest.parse::<u32>().ok())
                .ok_or_else(|| TypeConstraintError::InvalidValue(number.to_string()))?;
            sequence + 1
        }
        None => 1,
    };
    Ok(format!("{year_prefix}{next:04}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_number_of_the_year_starts_at_one() {
        let number = next_document_number(NumberPrefix::Quotation, day(2025, 3, 1), None).unwrap();
        assert_eq!(number, "Q-2025-0001");
    }

    #[test]
    fn numbers_increment_from_latest() {
        let number =
            next_document_number(NumberPrefix::Invoice, day(2025, 3, 1), Some("INV-2025-0041"))
                .unwrap();
        assert_eq!(number, "INV-2025-0042");
    }

    #[test]
    fn malformed_latest_number_is_rejected() {
        assert!(
            next_document_number(NumberPrefix::Invoice, day(2025, 3, 1), Some("INV-2025-x"))
                .is_err()
        );
    }

    #[test]
    fn stored_file_requires_path_and_name() {
        assert!(StoredFile::from_parts(Some("a".into()), None, Some(3)).is_none());
        let file = StoredFile::from_parts(Some("a".into()), Some("b.docx".into()), None).unwrap();
        assert_eq!(file.size, 0);
    }
}
