use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::company::{
    CompanySettings as DomainCompanySettings,
    UpdateCompanySettings as DomainUpdateCompanySettings,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::company_settings)]
pub struct CompanySettings {
    pub id: i32,
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_website: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::company_settings)]
#[diesel(treat_none_as_null = true)]
pub struct UpsertCompanySettings<'a> {
    pub company_name: Option<&'a str>,
    pub company_email: Option<&'a str>,
    pub company_phone: Option<&'a str>,
    pub company_address: Option<&'a str>,
    pub company_website: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl From<CompanySettings> for DomainCompanySettings {
    fn from(settings: CompanySettings) -> Self {
        Self {
            company_name: settings.company_name,
            company_email: settings.company_email,
            company_phone: settings.company_phone,
            company_address: settings.company_address,
            company_website: settings.company_website,
            updated_at: Some(settings.updated_at),
        }
    }
}

impl<'a> From<&'a DomainUpdateCompanySettings> for UpsertCompanySettings<'a> {
    fn from(settings: &'a DomainUpdateCompanySettings) -> Self {
        Self {
            company_name: settings.company_name.as_deref(),
            company_email: settings.company_email.as_deref(),
            company_phone: settings.company_phone.as_deref(),
            company_address: settings.company_address.as_deref(),
            company_website: settings.company_website.as_deref(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
