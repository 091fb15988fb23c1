use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::document::StoredFile;
use crate::domain::types::{TemplateId, TemplateName, UserId, string_enum};

string_enum!(
    /// Document a template produces.
    TemplateType {
        Quotation => "quotation",
        Invoice => "invoice",
    }
);

string_enum!(
    TemplateStatus {
        Draft => "draft",
        Saved => "saved",
    }
);

/// DOCX document template.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: TemplateId,
    pub name: TemplateName,
    pub description: Option<String>,
    pub template_type: TemplateType,
    pub file: Option<StoredFile>,
    pub status: TemplateStatus,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Template {
    /// Stored file when the template can produce documents of `kind`.
    pub fn usable_file(&self, kind: TemplateType) -> Option<&StoredFile> {
        if self.template_type == kind {
            self.file.as_ref()
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewTemplate {
    pub name: TemplateName,
    pub description: Option<String>,
    pub template_type: TemplateType,
    pub created_by: UserId,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateTemplate {
    pub name: TemplateName,
    pub description: Option<String>,
    pub status: TemplateStatus,
}
