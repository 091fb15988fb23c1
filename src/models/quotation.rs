//! Diesel models for quotations.
//!
//! The selected contact and company snapshot are JSON documents.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::Contact;
use crate::domain::company::CompanyInfo;
use crate::domain::document::StoredFile;
use crate::domain::quotation::{
    NewQuotation as DomainNewQuotation, Quotation as DomainQuotation, QuotationStatus,
    UpdateQuotation as DomainUpdateQuotation,
};
use crate::domain::types::{ClientId, QuotationId, TemplateId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::quotations)]
pub struct Quotation {
    pub id: i32,
    pub quotation_number: String,
    pub client_id: i32,
    pub selected_contact: String,
    pub template_id: i32,
    pub my_company_info: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i32>,
    pub due_date: Option<NaiveDateTime>,
    pub status: String,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::quotations)]
pub struct NewQuotation<'a> {
    pub quotation_number: &'a str,
    pub client_id: i32,
    pub selected_contact: String,
    pub template_id: i32,
    pub my_company_info: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub status: &'a str,
    pub created_by: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::quotations)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateQuotation<'a> {
    pub status: &'a str,
    pub due_date: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

/// Parses the JSON contact snapshot stored on documents.
pub(crate) fn parse_contact(raw: &str) -> Result<Contact, TypeConstraintError> {
    serde_json::from_str(raw)
        .map_err(|e| TypeConstraintError::InvalidValue(format!("selected_contact: {e}")))
}

/// Parses the optional JSON company snapshot stored on documents.
pub(crate) fn parse_company_info(
    raw: Option<&str>,
) -> Result<Option<CompanyInfo>, TypeConstraintError> {
    raw.map(serde_json::from_str)
        .transpose()
        .map_err(|e| TypeConstraintError::InvalidValue(format!("my_company_info: {e}")))
}

impl TryFrom<Quotation> for DomainQuotation {
    type Error = TypeConstraintError;

    fn try_from(quotation: Quotation) -> Result<Self, Self::Error> {
        Ok(Self {
            id: QuotationId::try_from(quotation.id)?,
            selected_contact: parse_contact(&quotation.selected_contact)?,
            my_company_info: parse_company_info(quotation.my_company_info.as_deref())?,
            quotation_number: quotation.quotation_number,
            client_id: ClientId::try_from(quotation.client_id)?,
            template_id: TemplateId::try_from(quotation.template_id)?,
            file: StoredFile::from_parts(
                quotation.file_path,
                quotation.file_name,
                quotation.file_size,
            ),
            due_date: quotation.due_date,
            status: QuotationStatus::try_from(quotation.status)?,
            created_by: UserId::try_from(quotation.created_by)?,
            created_at: quotation.created_at,
            updated_at: quotation.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewQuotation> for NewQuotation<'a> {
    type Error = serde_json::Error;

    fn try_from(quotation: &'a DomainNewQuotation) -> Result<Self, Self::Error> {
        Ok(Self {
            quotation_number: quotation.quotation_number.as_str(),
            client_id: quotation.client_id.get(),
            selected_contact: serde_json::to_string(&quotation.selected_contact)?,
            template_id: quotation.template_id.get(),
            my_company_info: quotation
                .my_company_info
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            due_date: quotation.due_date,
            status: QuotationStatus::Pending.as_str(),
            created_by: quotation.created_by.get(),
        })
    }
}

impl<'a> From<&'a DomainUpdateQuotation> for UpdateQuotation<'a> {
    fn from(update: &'a DomainUpdateQuotation) -> Self {
        Self {
            status: update.status.as_str(),
            due_date: update.due_date,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ContactEmail, PersonName};

    #[test]
    fn new_quotation_serializes_snapshots() {
        let domain = DomainNewQuotation {
            quotation_number: "Q-2025-0001".into(),
            client_id: ClientId::new(1).unwrap(),
            selected_contact: Contact {
                name: PersonName::new("Jane").unwrap(),
                email: ContactEmail::new("jane@acme.sg").unwrap(),
                phone: None,
            },
            template_id: TemplateId::new(2).unwrap(),
            my_company_info: Some(CompanyInfo {
                name: "Own Co".into(),
                ..CompanyInfo::default()
            }),
            due_date: None,
            created_by: UserId::new(1).unwrap(),
        };
        let new = NewQuotation::try_from(&domain).unwrap();
        assert_eq!(new.status, "pending");
        assert!(new.selected_contact.contains("jane@acme.sg"));
        assert!(new.my_company_info.unwrap().contains("Own Co"));
    }

    #[test]
    fn missing_company_snapshot_is_none() {
        assert_eq!(parse_company_info(None), Ok(None));
        assert!(parse_company_info(Some("{")).is_err());
    }
}
