//! Configuration handed to the external document editor and the payloads it
//! posts back.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentPermissions {
    pub edit: bool,
    pub download: bool,
    pub print: bool,
    pub review: bool,
    pub comment: bool,
}

impl Default for DocumentPermissions {
    fn default() -> Self {
        Self {
            edit: true,
            download: true,
            print: true,
            review: true,
            comment: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorDocument {
    pub file_type: String,
    /// Unique per editing session so the document service never serves a
    /// stale cached copy.
    pub key: String,
    pub title: String,
    pub url: String,
    pub permissions: DocumentPermissions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorUser {
    pub id: String,
    pub name: String,
    pub group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorCustomization {
    pub autosave: bool,
    pub forcesave: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub callback_url: String,
    pub mode: String,
    pub lang: String,
    pub user: EditorUser,
    pub customization: EditorCustomization,
}

/// Body of `GET /api/v1/editor/{kind}/{id}/config`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfigResponse {
    pub document: EditorDocument,
    pub document_type: String,
    pub editor_config: EditorSettings,
    pub height: String,
    pub width: String,
    /// HS256 signature over the fields above, checked by the document service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Query string carrying the document access token.
#[derive(Debug, Deserialize)]
pub struct DocumentTokenQuery {
    pub token: String,
}

/// Save callback posted by the document service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EditorCallback {
    pub status: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl EditorCallback {
    /// Status `2` (ready for saving) and `6` (force save) carry a new file.
    pub fn has_new_version(&self) -> bool {
        matches!(self.status, 2 | 6)
    }
}

/// Reply expected by the document service; `error: 0` acknowledges.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CallbackReply {
    pub error: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CallbackReply {
    pub fn ok() -> Self {
        Self {
            error: 0,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: 1,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_statuses() {
        let callback: EditorCallback =
            serde_json::from_str(r#"{"status":2,"url":"http://docs/x.docx","key":"k"}"#).unwrap();
        assert!(callback.has_new_version());
        let callback: EditorCallback = serde_json::from_str(r#"{"status":4}"#).unwrap();
        assert!(!callback.has_new_version());
        assert_eq!(
            serde_json::to_string(&CallbackReply::ok()).unwrap(),
            r#"{"error":0}"#
        );
    }
}
