use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Own company details, a single row edited on the settings page.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanySettings {
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_website: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Snapshot of [`CompanySettings`] stored on quotations and invoices.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
}

impl From<&CompanySettings> for CompanyInfo {
    fn from(settings: &CompanySettings) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            name: text(&settings.company_name),
            email: text(&settings.company_email),
            phone: text(&settings.company_phone),
            address: text(&settings.company_address),
            website: text(&settings.company_website),
        }
    }
}

/// Values submitted from the settings page.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct UpdateCompanySettings {
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_website: Option<String>,
}
