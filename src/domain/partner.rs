use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::document::StoredFile;
use crate::domain::types::{CompanyName, ContactEmail, PartnerId, PersonName, PhoneNumber};

/// MIME types accepted for partner contracts.
pub const CONTRACT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Uploaded partner contract.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractFile {
    pub file: StoredFile,
    pub mime_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Partner {
    pub id: PartnerId,
    pub company_name: CompanyName,
    pub contact_person_name: PersonName,
    pub phone_number: Option<PhoneNumber>,
    pub email_address: Option<ContactEmail>,
    pub contract: Option<ContractFile>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewPartner {
    pub company_name: CompanyName,
    pub contact_person_name: PersonName,
    pub phone_number: Option<PhoneNumber>,
    pub email_address: Option<ContactEmail>,
}

pub type UpdatePartner = NewPartner;

/// Resolves the MIME type of a contract from its declared type or extension.
///
/// Returns `None` when the file is neither PDF nor Word.
pub fn contract_mime_type(file_name: &str, declared: Option<&str>) -> Option<&'static str> {
    if let Some(declared) = declared
        && let Some(known) = CONTRACT_MIME_TYPES.iter().find(|m| **m == declared)
    {
        return Some(*known);
    }
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some(CONTRACT_MIME_TYPES[0]),
        "doc" => Some(CONTRACT_MIME_TYPES[1]),
        "docx" => Some(CONTRACT_MIME_TYPES[2]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_types_are_restricted() {
        assert_eq!(contract_mime_type("a.PDF", None), Some("application/pdf"));
        assert_eq!(
            contract_mime_type("x", Some("application/msword")),
            Some("application/msword")
        );
        assert_eq!(contract_mime_type("a.png", Some("image/png")), None);
        assert_eq!(contract_mime_type("noext", None), None);
    }
}
