//! DTOs for document template pages.

use crate::domain::template::Template;
use crate::pagination::Paginated;

#[derive(Debug)]
pub struct TemplatesPageData {
    pub templates: Paginated<Template>,
    pub search: Option<String>,
    pub template_type: Option<String>,
}

/// Template opened in the document editor.
#[derive(Debug)]
pub struct TemplatePageData {
    pub template: Template,
    /// Placeholders currently in the template document.
    pub placeholders: Vec<String>,
    pub editor_script_url: String,
}
