use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, CompanyName, ContactEmail, PartnerId, PersonName, PhoneNumber};

/// Person reachable at a client company.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub name: PersonName,
    pub email: ContactEmail,
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub company_name: CompanyName,
    pub uen: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub contacts: Vec<Contact>,
    pub partner_id: Option<PartnerId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Client {
    /// Contact selected by its position in the contact list.
    pub fn contact(&self, index: usize) -> Option<&Contact> {
        self.contacts.get(index)
    }
}

/// Fields shared by client creation and update.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewClient {
    pub company_name: CompanyName,
    pub uen: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub contacts: Vec<Contact>,
    pub partner_id: Option<PartnerId>,
}

pub type UpdateClient = NewClient;

/// Returns the first contact email that appears more than once.
///
/// Emails are already lower-cased by [`ContactEmail`], so the comparison is
/// case-insensitive.
pub fn find_duplicate_email(contacts: &[Contact]) -> Option<&ContactEmail> {
    let mut seen = HashSet::new();
    contacts
        .iter()
        .map(|contact| &contact.email)
        .find(|email| !seen.insert(email.as_str()))
}
