use serde::Deserialize;
use validator::Validate;

use crate::domain::email::{
    EmailTemplateType, LinkedDocument, NewEmailTemplate, UpdateEmailTemplate,
};
use crate::domain::types::{
    ContactEmail, EmailBody, EmailSubject, EmailTemplateId, InvoiceId, QuotationId, TemplateName,
    UserId, trimmed_opt,
};
use crate::forms::{FormError, checkbox, parse_optional_id};
use crate::placeholders::extract_variables;

#[derive(Debug, Deserialize, Validate)]
/// Form data for creating or editing an email template.
pub struct EmailTemplateForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 998))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
    pub template_type: String,
    #[serde(default)]
    pub is_default: Option<String>,
}

/// Validated email template fields with the derived variable list.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailTemplatePayload {
    pub name: TemplateName,
    pub subject: EmailSubject,
    pub body: EmailBody,
    pub template_type: EmailTemplateType,
    pub variables: Vec<String>,
    pub is_default: bool,
}

impl TryFrom<EmailTemplateForm> for EmailTemplatePayload {
    type Error = FormError;

    fn try_from(form: EmailTemplateForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let subject = EmailSubject::new(form.subject)?;
        let body = EmailBody::new(form.body)?;

        let mut variables = extract_variables(subject.as_str());
        for name in extract_variables(body.as_str()) {
            if !variables.contains(&name) {
                variables.push(name);
            }
        }

        Ok(Self {
            name: TemplateName::new(form.name)?,
            subject,
            body,
            template_type: EmailTemplateType::try_from(form.template_type)?,
            variables,
            is_default: checkbox(form.is_default.as_deref()),
        })
    }
}

impl EmailTemplatePayload {
    pub fn into_new(self, created_by: UserId) -> NewEmailTemplate {
        NewEmailTemplate {
            name: self.name,
            subject: self.subject,
            body: self.body,
            template_type: self.template_type,
            variables: self.variables,
            is_default: self.is_default,
            created_by,
        }
    }
}

impl From<EmailTemplatePayload> for UpdateEmailTemplate {
    fn from(payload: EmailTemplatePayload) -> Self {
        UpdateEmailTemplate {
            name: payload.name,
            subject: payload.subject,
            body: payload.body,
            template_type: payload.template_type,
            variables: payload.variables,
            is_default: payload.is_default,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// Query string of the compose page selecting a template and a document.
pub struct ComposeQuery {
    pub template_id: Option<String>,
    pub quotation_id: Option<String>,
    pub invoice_id: Option<String>,
}

/// Parsed selection of the compose page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeSelection {
    pub template_id: Option<EmailTemplateId>,
    pub document: Option<LinkedDocument>,
}

fn linked_document(
    quotation_id: Option<&str>,
    invoice_id: Option<&str>,
) -> Result<Option<LinkedDocument>, FormError> {
    let quotation = parse_optional_id(quotation_id, "quotation")?;
    let invoice = parse_optional_id(invoice_id, "invoice")?;
    match (quotation, invoice) {
        (Some(_), Some(_)) => Err(FormError::AmbiguousDocument),
        (Some(id), None) => Ok(Some(LinkedDocument::Quotation(
            QuotationId::new(id).map_err(|_| FormError::InvalidId("quotation"))?,
        ))),
        (None, Some(id)) => Ok(Some(LinkedDocument::Invoice(
            InvoiceId::new(id).map_err(|_| FormError::InvalidId("invoice"))?,
        ))),
        (None, None) => Ok(None),
    }
}

fn email_template_id(raw: Option<&str>) -> Result<Option<EmailTemplateId>, FormError> {
    parse_optional_id(raw, "email template")?
        .map(|id| EmailTemplateId::new(id).map_err(|_| FormError::InvalidId("email template")))
        .transpose()
}

impl TryFrom<ComposeQuery> for ComposeSelection {
    type Error = FormError;

    fn try_from(query: ComposeQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            template_id: email_template_id(query.template_id.as_deref())?,
            document: linked_document(query.quotation_id.as_deref(), query.invoice_id.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Form data posted by the compose page.
pub struct SendEmailForm {
    #[validate(email)]
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[validate(length(min = 1, max = 998))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
    #[serde(default)]
    pub email_template_id: Option<String>,
    #[serde(default)]
    pub quotation_id: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub attach_document: Option<String>,
}

/// Validated message still carrying its `{{placeholder}}` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct SendEmailPayload {
    pub recipient_email: ContactEmail,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
    pub email_template_id: Option<EmailTemplateId>,
    pub document: Option<LinkedDocument>,
    pub attach_document: bool,
}

impl TryFrom<SendEmailForm> for SendEmailPayload {
    type Error = FormError;

    fn try_from(form: SendEmailForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            recipient_email: ContactEmail::new(form.recipient_email)
                .map_err(|_| FormError::InvalidEmail)?,
            recipient_name: trimmed_opt(form.recipient_name),
            subject: form.subject.trim().to_string(),
            body: form.body,
            email_template_id: email_template_id(form.email_template_id.as_deref())?,
            document: linked_document(form.quotation_id.as_deref(), form.invoice_id.as_deref())?,
            attach_document: checkbox(form.attach_document.as_deref()),
        })
    }
}
