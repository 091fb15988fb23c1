use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::quotation::{QuotationStatus, UpdateQuotation};
use crate::domain::types::{ClientId, TemplateId};
use crate::forms::{FormError, parse_optional_date, start_of_day};

#[derive(Debug, Deserialize)]
/// Form data for generating a quotation.
pub struct QuotationForm {
    pub client_id: i32,
    /// Position of the selected contact within the client's contacts.
    pub contact_index: usize,
    pub template_id: i32,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Validated input for quotation generation.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotationPayload {
    pub client_id: ClientId,
    pub contact_index: usize,
    pub template_id: TemplateId,
    pub due_date: Option<NaiveDate>,
}

impl TryFrom<QuotationForm> for QuotationPayload {
    type Error = FormError;

    fn try_from(form: QuotationForm) -> Result<Self, Self::Error> {
        Ok(Self {
            client_id: ClientId::new(form.client_id).map_err(|_| FormError::InvalidId("client"))?,
            contact_index: form.contact_index,
            template_id: TemplateId::new(form.template_id)
                .map_err(|_| FormError::InvalidId("template"))?,
            due_date: parse_optional_date(form.due_date.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
/// Form data for changing a quotation's status or due date.
pub struct QuotationUpdateForm {
    pub status: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl TryFrom<QuotationUpdateForm> for UpdateQuotation {
    type Error = FormError;

    fn try_from(form: QuotationUpdateForm) -> Result<Self, Self::Error> {
        Ok(UpdateQuotation {
            status: QuotationStatus::try_from(form.status)?,
            due_date: parse_optional_date(form.due_date.as_deref())?.map(start_of_day),
        })
    }
}
