use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::document::DocumentKind;
use crate::domain::types::{
    ContactEmail, EmailBody, EmailHistoryId, EmailSubject, EmailTemplateId, InvoiceId, QuotationId,
    TemplateName, UserId, string_enum,
};

string_enum!(
    EmailTemplateType {
        Quotation => "quotation",
        Invoice => "invoice",
        General => "general",
    }
);

string_enum!(
    EmailStatus {
        Sent => "sent",
        Failed => "failed",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmailTemplate {
    pub id: EmailTemplateId,
    pub name: TemplateName,
    pub subject: EmailSubject,
    pub body: EmailBody,
    pub template_type: EmailTemplateType,
    /// Placeholder names found in subject and body, in order of appearance.
    pub variables: Vec<String>,
    pub is_default: bool,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewEmailTemplate {
    pub name: TemplateName,
    pub subject: EmailSubject,
    pub body: EmailBody,
    pub template_type: EmailTemplateType,
    pub variables: Vec<String>,
    pub is_default: bool,
    pub created_by: UserId,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateEmailTemplate {
    pub name: TemplateName,
    pub subject: EmailSubject,
    pub body: EmailBody,
    pub template_type: EmailTemplateType,
    pub variables: Vec<String>,
    pub is_default: bool,
}

/// Quotation or invoice an email is about.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkedDocument {
    Quotation(QuotationId),
    Invoice(InvoiceId),
}

impl LinkedDocument {
    pub fn kind(self) -> DocumentKind {
        match self {
            LinkedDocument::Quotation(_) => DocumentKind::Quotation,
            LinkedDocument::Invoice(_) => DocumentKind::Invoice,
        }
    }
}

/// Audit record of a sent or failed email.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmailHistory {
    pub id: EmailHistoryId,
    pub recipient_email: String,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
    pub quotation_id: Option<QuotationId>,
    pub invoice_id: Option<InvoiceId>,
    pub document_number: Option<String>,
    pub document_type: Option<DocumentKind>,
    pub email_template_id: Option<EmailTemplateId>,
    pub status: EmailStatus,
    pub error_message: Option<String>,
    pub sent_by: UserId,
    pub sent_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewEmailHistory {
    pub recipient_email: ContactEmail,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
    pub document: Option<LinkedDocument>,
    pub document_number: Option<String>,
    pub email_template_id: Option<EmailTemplateId>,
    pub status: EmailStatus,
    pub error_message: Option<String>,
    pub sent_by: UserId,
}

/// Fully rendered message handed to the delivery service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OutgoingEmail {
    pub recipient_email: ContactEmail,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
    /// Absolute paths of files to attach.
    pub attachments: Vec<String>,
}
