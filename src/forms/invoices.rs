use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::domain::invoice::{InvoiceStatus, UpdateInvoice, due_date_is_valid};
use crate::domain::types::{QuotationId, TemplateId};
use crate::forms::{FormError, checkbox, parse_optional_date, start_of_day};

/// Parses an optional due date that, when present, must be after `today`.
fn future_due_date(raw: Option<&str>, today: NaiveDate) -> Result<Option<NaiveDate>, FormError> {
    match parse_optional_date(raw)? {
        Some(due) if !due_date_is_valid(due, today) => Err(FormError::DueDateNotInFuture),
        other => Ok(other),
    }
}

#[derive(Debug, Deserialize)]
/// Form data for generating an invoice from an accepted quotation.
pub struct InvoiceForm {
    pub quotation_id: i32,
    pub template_id: i32,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Validated input for invoice generation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePayload {
    pub quotation_id: QuotationId,
    pub template_id: TemplateId,
    pub due_date: Option<NaiveDate>,
}

impl InvoiceForm {
    pub fn into_payload(self, today: NaiveDate) -> Result<InvoicePayload, FormError> {
        Ok(InvoicePayload {
            quotation_id: QuotationId::new(self.quotation_id)
                .map_err(|_| FormError::InvalidId("quotation"))?,
            template_id: TemplateId::new(self.template_id)
                .map_err(|_| FormError::InvalidId("template"))?,
            due_date: future_due_date(self.due_date.as_deref(), today)?,
        })
    }
}

#[derive(Debug, Deserialize)]
/// Form data for changing an invoice's status or due date.
pub struct InvoiceUpdateForm {
    pub status: String,
    #[serde(default)]
    pub due_date: Option<String>,
    /// Checkbox asking to email the client when the invoice becomes paid.
    #[serde(default)]
    pub send_notification_email: Option<String>,
}

/// Validated invoice update.
///
/// The due date is only parsed here; whether it must lie in the future
/// depends on the stored invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceUpdatePayload {
    pub update: UpdateInvoice,
    pub send_notification_email: bool,
}

impl TryFrom<InvoiceUpdateForm> for InvoiceUpdatePayload {
    type Error = FormError;

    fn try_from(form: InvoiceUpdateForm) -> Result<Self, Self::Error> {
        Ok(Self {
            update: UpdateInvoice {
                status: InvoiceStatus::try_from(form.status)?,
                due_date: parse_optional_date(form.due_date.as_deref())?.map(start_of_day),
            },
            send_notification_email: checkbox(form.send_notification_email.as_deref()),
        })
    }
}

/// Rejects a changed due date that is not after `today`.
pub fn ensure_future_due_date(
    update: &UpdateInvoice,
    stored: Option<NaiveDateTime>,
    today: NaiveDate,
) -> Result<(), FormError> {
    match update.due_date {
        Some(due)
            if stored.map(|d| d.date()) != Some(due.date())
                && !due_date_is_valid(due.date(), today) =>
        {
            Err(FormError::DueDateNotInFuture)
        }
        _ => Ok(()),
    }
}
