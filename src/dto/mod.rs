//! DTO modules that bridge services with templates and APIs.

use std::path::PathBuf;

use serde::Deserialize;

pub mod clients;
pub mod dashboard;
pub mod editor;
pub mod emails;
pub mod invoices;
pub mod notifications;
pub mod partners;
pub mod quotations;
pub mod templates;
pub mod users;

/// Query string shared by the list pages.
///
/// Each page reads the filter that applies to it and ignores the others.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub status: Option<String>,
    pub industry: Option<String>,
    pub template_type: Option<String>,
    pub unread: Option<String>,
}

/// Highest page number accepted from a query string.
pub const MAX_PAGE: usize = i32::MAX as usize;

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ListQuery {
    /// Requested page, 1-based and at most [`MAX_PAGE`].
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn search(&self) -> Option<&str> {
        non_blank(&self.search)
    }

    pub fn status(&self) -> Option<&str> {
        non_blank(&self.status)
    }

    pub fn industry(&self) -> Option<&str> {
        non_blank(&self.industry)
    }

    pub fn template_type(&self) -> Option<&str> {
        non_blank(&self.template_type)
    }

    pub fn unread_only(&self) -> bool {
        matches!(non_blank(&self.unread), Some("1" | "true" | "on"))
    }
}

/// Stored file ready to be streamed back to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: String,
}

/// A newly generated quotation or invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument<T> {
    pub record: T,
    /// Placeholders the generated document still contains.
    pub unfilled: Vec<String>,
}

pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
