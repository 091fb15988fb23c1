//! Diesel models for email templates and the sent-email audit log.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::DocumentKind;
use crate::domain::email::{
    EmailHistory as DomainEmailHistory, EmailStatus, EmailTemplate as DomainEmailTemplate,
    EmailTemplateType, LinkedDocument, NewEmailHistory as DomainNewEmailHistory,
    NewEmailTemplate as DomainNewEmailTemplate, UpdateEmailTemplate as DomainUpdateEmailTemplate,
};
use crate::domain::types::{
    EmailBody, EmailHistoryId, EmailSubject, EmailTemplateId, InvoiceId, QuotationId,
    TemplateName, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::email_templates)]
pub struct EmailTemplate {
    pub id: i32,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub template_type: String,
    pub variables: String,
    pub is_default: bool,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::email_templates)]
pub struct NewEmailTemplate<'a> {
    pub name: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub template_type: &'a str,
    pub variables: String,
    pub is_default: bool,
    pub created_by: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::email_templates)]
pub struct UpdateEmailTemplate<'a> {
    pub name: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub template_type: &'a str,
    pub variables: String,
    pub is_default: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::email_history)]
pub struct EmailHistory {
    pub id: i32,
    pub recipient_email: String,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
    pub quotation_id: Option<i32>,
    pub invoice_id: Option<i32>,
    pub document_number: Option<String>,
    pub document_type: Option<String>,
    pub email_template_id: Option<i32>,
    pub status: String,
    pub error_message: Option<String>,
    pub sent_by: i32,
    pub sent_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::email_history)]
pub struct NewEmailHistory<'a> {
    pub recipient_email: &'a str,
    pub recipient_name: Option<&'a str>,
    pub subject: &'a str,
    pub body: &'a str,
    pub quotation_id: Option<i32>,
    pub invoice_id: Option<i32>,
    pub document_number: Option<&'a str>,
    pub document_type: Option<&'a str>,
    pub email_template_id: Option<i32>,
    pub status: &'a str,
    pub error_message: Option<&'a str>,
    pub sent_by: i32,
}

impl TryFrom<EmailTemplate> for DomainEmailTemplate {
    type Error = TypeConstraintError;

    fn try_from(template: EmailTemplate) -> Result<Self, Self::Error> {
        let variables: Vec<String> = serde_json::from_str(&template.variables)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("variables: {e}")))?;
        Ok(Self {
            id: EmailTemplateId::try_from(template.id)?,
            name: TemplateName::new(template.name)?,
            subject: EmailSubject::new(template.subject)?,
            body: EmailBody::new(template.body)?,
            template_type: EmailTemplateType::try_from(template.template_type)?,
            variables,
            is_default: template.is_default,
            created_by: UserId::try_from(template.created_by)?,
            created_at: template.created_at,
            updated_at: template.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewEmailTemplate> for NewEmailTemplate<'a> {
    type Error = serde_json::Error;

    fn try_from(template: &'a DomainNewEmailTemplate) -> Result<Self, Self::Error> {
        Ok(Self {
            name: template.name.as_str(),
            subject: template.subject.as_str(),
            body: template.body.as_str(),
            template_type: template.template_type.as_str(),
            variables: serde_json::to_string(&template.variables)?,
            is_default: template.is_default,
            created_by: template.created_by.get(),
        })
    }
}

impl<'a> TryFrom<&'a DomainUpdateEmailTemplate> for UpdateEmailTemplate<'a> {
    type Error = serde_json::Error;

    fn try_from(template: &'a DomainUpdateEmailTemplate) -> Result<Self, Self::Error> {
        Ok(Self {
            name: template.name.as_str(),
            subject: template.subject.as_str(),
            body: template.body.as_str(),
            template_type: template.template_type.as_str(),
            variables: serde_json::to_string(&template.variables)?,
            is_default: template.is_default,
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }
}

impl TryFrom<EmailHistory> for DomainEmailHistory {
    type Error = TypeConstraintError;

    fn try_from(history: EmailHistory) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EmailHistoryId::try_from(history.id)?,
            recipient_email: history.recipient_email,
            recipient_name: history.recipient_name,
            subject: history.subject,
            body: history.body,
            quotation_id: history.quotation_id.map(QuotationId::try_from).transpose()?,
            invoice_id: history.invoice_id.map(InvoiceId::try_from).transpose()?,
            document_number: history.document_number,
            document_type: history
                .document_type
                .map(DocumentKind::try_from)
                .transpose()?,
            email_template_id: history
                .email_template_id
                .map(EmailTemplateId::try_from)
                .transpose()?,
            status: EmailStatus::try_from(history.status)?,
            error_message: history.error_message,
            sent_by: UserId::try_from(history.sent_by)?,
            sent_at: history.sent_at,
        })
    }
}

impl<'a> From<&'a DomainNewEmailHistory> for NewEmailHistory<'a> {
    fn from(history: &'a DomainNewEmailHistory) -> Self {
        let (quotation_id, invoice_id) = match history.document {
            Some(LinkedDocument::Quotation(id)) => (Some(id.get()), None),
            Some(LinkedDocument::Invoice(id)) => (None, Some(id.get())),
            None => (None, None),
        };
        Self {
            recipient_email: history.recipient_email.as_str(),
            recipient_name: history.recipient_name.as_deref(),
            subject: history.subject.as_str(),
            body: history.body.as_str(),
            quotation_id,
            invoice_id,
            document_number: history.document_number.as_deref(),
            document_type: history.document.map(|doc| doc.kind().as_str()),
            email_template_id: history.email_template_id.map(EmailTemplateId::get),
            status: history.status.as_str(),
            error_message: history.error_message.as_deref(),
            sent_by: history.sent_by.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ContactEmail;

    #[test]
    fn linked_invoice_fills_invoice_columns() {
        let domain = DomainNewEmailHistory {
            recipient_email: ContactEmail::new("jane@acme.sg").unwrap(),
            recipient_name: Some("Jane".into()),
            subject: "Invoice".into(),
            body: "<p>Hi</p>".into(),
            document: Some(LinkedDocument::Invoice(InvoiceId::new(9).unwrap())),
            document_number: Some("INV-2025-0009".into()),
            email_template_id: None,
            status: EmailStatus::Sent,
            error_message: None,
            sent_by: UserId::new(1).unwrap(),
        };
        let new = NewEmailHistory::from(&domain);
        assert_eq!(new.invoice_id, Some(9));
        assert_eq!(new.quotation_id, None);
        assert_eq!(new.document_type, Some("invoice"));
        assert_eq!(new.status, "sent");
    }
}
