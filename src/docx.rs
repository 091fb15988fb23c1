//! Placeholder filling inside DOCX documents.
//!
//! A DOCX file is a zip archive of XML parts. Only the main document, headers
//! and footers carry visible text, so those are the parts rewritten; every
//! other entry is copied through untouched.

use std::io::{self, Cursor, Read, Write};

use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::placeholders::{Variables, extract_variables, substitute};

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("invalid document archive: {0}")]
    Archive(#[from] ZipError),

    #[error("failed to read document part: {0}")]
    Io(#[from] io::Error),
}

/// Result of filling a document.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledDocument {
    pub bytes: Vec<u8>,
    /// Placeholders left in the document, in order of first appearance.
    pub unfilled: Vec<String>,
}

fn is_text_part(name: &str) -> bool {
    name == "word/document.xml"
        || (name.ends_with(".xml")
            && (name.starts_with("word/header") || name.starts_with("word/footer")))
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn merge_unique(into: &mut Vec<String>, names: Vec<String>) {
    for name in names {
        if !into.contains(&name) {
            into.push(name);
        }
    }
}

/// Replaces placeholders in the text parts of `document`.
///
/// Variables with an empty value are not substituted, so their tokens stay
/// in the document and are reported as unfilled.
pub fn fill(document: &[u8], variables: &Variables) -> Result<FilledDocument, DocxError> {
    let escaped: Variables = variables
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name.clone(), escape_xml(value)))
        .collect();

    let mut archive = ZipArchive::new(Cursor::new(document))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut unfilled = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        if !is_text_part(&name) {
            writer.raw_copy_file(entry)?;
            continue;
        }

        let options = SimpleFileOptions::default().compression_method(entry.compression());
        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        let filled = substitute(&xml, &escaped);
        merge_unique(&mut unfilled, extract_variables(&filled));

        writer.start_file(name, options)?;
        writer.write_all(filled.as_bytes())?;
    }

    let bytes = writer.finish()?.into_inner();
    Ok(FilledDocument { bytes, unfilled })
}

/// Placeholders present in the text parts of `document`.
pub fn placeholders(document: &[u8]) -> Result<Vec<String>, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(document))?;
    let mut found = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !is_text_part(entry.name()) {
            continue;
        }
        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        merge_unique(&mut found, extract_variables(&xml));
    }
    Ok(found)
}
