use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use validator::Validate;

use crate::domain::template::{NewTemplate, TemplateStatus, TemplateType, UpdateTemplate};
use crate::domain::types::{TemplateName, UserId, trimmed_opt};
use crate::forms::FormError;

const DOCX_EXTENSION: &str = ".docx";

/// Multipart upload creating a template together with its DOCX file.
#[derive(MultipartForm)]
pub struct UploadTemplateForm {
    pub name: Text<String>,
    pub description: Option<Text<String>>,
    pub template_type: Text<String>,
    #[multipart(limit = "20MB")]
    pub file: TempFile,
}

impl UploadTemplateForm {
    /// Validated template metadata and the original file name.
    pub fn to_new_template(&self, created_by: UserId) -> Result<(NewTemplate, String), FormError> {
        let file_name = self
            .file
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or(FormError::MissingFile)?;
        if !file_name.to_ascii_lowercase().ends_with(DOCX_EXTENSION) {
            return Err(FormError::UnsupportedFile);
        }

        let template = NewTemplate {
            name: TemplateName::new(self.name.as_str())?,
            description: trimmed_opt(self.description.as_ref().map(|d| d.as_str().to_string())),
            template_type: TemplateType::try_from(self.template_type.as_str())?,
            created_by,
        };
        Ok((template, file_name))
    }
}

/// Multipart upload replacing the DOCX file of an existing template.
#[derive(MultipartForm)]
pub struct ReplaceTemplateFileForm {
    #[multipart(limit = "20MB")]
    pub file: TempFile,
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for editing template metadata.
pub struct TemplateForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
}

impl TryFrom<TemplateForm> for UpdateTemplate {
    type Error = FormError;

    fn try_from(form: TemplateForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(UpdateTemplate {
            name: TemplateName::new(form.name)?,
            description: trimmed_opt(form.description),
            status: TemplateStatus::try_from(form.status)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_form_requires_known_status() {
        let form = TemplateForm {
            name: "Quote".into(),
            description: Some("  ".into()),
            status: "saved".into(),
        };
        let update = UpdateTemplate::try_from(form).unwrap();
        assert_eq!(update.status, TemplateStatus::Saved);
        assert_eq!(update.description, None);

        let form = TemplateForm {
            name: "Quote".into(),
            description: None,
            status: "archived".into(),
        };
        assert!(UpdateTemplate::try_from(form).is_err());
    }
}
