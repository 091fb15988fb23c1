use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::StoredFile;
use crate::domain::template::{
    NewTemplate as DomainNewTemplate, Template as DomainTemplate, TemplateStatus, TemplateType,
    UpdateTemplate as DomainUpdateTemplate,
};
use crate::domain::types::{TemplateId, TemplateName, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::templates)]
pub struct Template {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub template_type: String,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i32>,
    pub status: String,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::templates)]
pub struct NewTemplate<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub template_type: &'a str,
    pub status: &'a str,
    pub created_by: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::templates)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateTemplate<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Template> for DomainTemplate {
    type Error = TypeConstraintError;

    fn try_from(template: Template) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TemplateId::try_from(template.id)?,
            name: TemplateName::new(template.name)?,
            description: template.description,
            template_type: TemplateType::try_from(template.template_type)?,
            file: StoredFile::from_parts(template.file_path, template.file_name, template.file_size),
            status: TemplateStatus::try_from(template.status)?,
            created_by: UserId::try_from(template.created_by)?,
            created_at: template.created_at,
            updated_at: template.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewTemplate> for NewTemplate<'a> {
    fn from(template: &'a DomainNewTemplate) -> Self {
        Self {
            name: template.name.as_str(),
            description: template.description.as_deref(),
            template_type: template.template_type.as_str(),
            status: TemplateStatus::Draft.as_str(),
            created_by: template.created_by.get(),
        }
    }
}

impl<'a> From<&'a DomainUpdateTemplate> for UpdateTemplate<'a> {
    fn from(template: &'a DomainUpdateTemplate) -> Self {
        Self {
            name: template.name.as_str(),
            description: template.description.as_deref(),
            status: template.status.as_str(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_templates_start_as_drafts() {
        let domain = DomainNewTemplate {
            name: TemplateName::new("Standard quote").unwrap(),
            description: None,
            template_type: TemplateType::Quotation,
            created_by: UserId::new(1).unwrap(),
        };
        let new = NewTemplate::from(&domain);
        assert_eq!(new.status, "draft");
        assert_eq!(new.template_type, "quotation");
    }

    #[test]
    fn unknown_template_type_is_rejected() {
        let now = chrono::Utc::now().naive_utc();
        let row = Template {
            id: 1,
            name: "T".into(),
            description: None,
            template_type: "receipt".into(),
            file_path: None,
            file_name: None,
            file_size: None,
            status: "draft".into(),
            created_by: 1,
            created_at: now,
            updated_at: now,
        };
        assert!(DomainTemplate::try_from(row).is_err());
    }
}
