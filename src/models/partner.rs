use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::StoredFile;
use crate::domain::partner::{ContractFile, NewPartner as DomainNewPartner, Partner as DomainPartner};
use crate::domain::types::{
    CompanyName, ContactEmail, PartnerId, PersonName, PhoneNumber, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::partners)]
pub struct Partner {
    pub id: i32,
    pub company_name: String,
    pub contact_person_name: String,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub contract_file_path: Option<String>,
    pub contract_file_name: Option<String>,
    pub contract_file_size: Option<i32>,
    pub contract_mime_type: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::partners)]
pub struct NewPartner<'a> {
    pub company_name: &'a str,
    pub contact_person_name: &'a str,
    pub phone_number: Option<&'a str>,
    pub email_address: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::partners)]
#[diesel(treat_none_as_null = true)]
pub struct UpdatePartner<'a> {
    pub company_name: &'a str,
    pub contact_person_name: &'a str,
    pub phone_number: Option<&'a str>,
    pub email_address: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

/// Changeset replacing the stored contract.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::partners)]
pub struct PartnerContract<'a> {
    pub contract_file_path: &'a str,
    pub contract_file_name: &'a str,
    pub contract_file_size: i32,
    pub contract_mime_type: &'a str,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Partner> for DomainPartner {
    type Error = TypeConstraintError;

    fn try_from(partner: Partner) -> Result<Self, Self::Error> {
        let contract = StoredFile::from_parts(
            partner.contract_file_path,
            partner.contract_file_name,
            partner.contract_file_size,
        )
        .map(|file| ContractFile {
            file,
            mime_type: partner.contract_mime_type.unwrap_or_default(),
        });

        Ok(Self {
            id: PartnerId::try_from(partner.id)?,
            company_name: CompanyName::new(partner.company_name)?,
            contact_person_name: PersonName::new(partner.contact_person_name)?,
            phone_number: partner.phone_number.map(PhoneNumber::new).transpose()?,
            email_address: partner.email_address.map(ContactEmail::new).transpose()?,
            contract,
            created_at: partner.created_at,
            updated_at: partner.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewPartner> for NewPartner<'a> {
    fn from(partner: &'a DomainNewPartner) -> Self {
        Self {
            company_name: partner.company_name.as_str(),
            contact_person_name: partner.contact_person_name.as_str(),
            phone_number: partner.phone_number.as_ref().map(PhoneNumber::as_str),
            email_address: partner.email_address.as_ref().map(ContactEmail::as_str),
        }
    }
}

impl<'a> From<&'a DomainNewPartner> for UpdatePartner<'a> {
    fn from(partner: &'a DomainNewPartner) -> Self {
        let new = NewPartner::from(partner);
        Self {
            company_name: new.company_name,
            contact_person_name: new.contact_person_name,
            phone_number: new.phone_number,
            email_address: new.email_address,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl<'a> From<&'a ContractFile> for PartnerContract<'a> {
    fn from(contract: &'a ContractFile) -> Self {
        Self {
            contract_file_path: contract.file.path.as_str(),
            contract_file_name: contract.file.name.as_str(),
            contract_file_size: contract.file.size,
            contract_mime_type: contract.mime_type.as_str(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_columns_build_contract() {
        let now = chrono::Utc::now().naive_utc();
        let row = Partner {
            id: 4,
            company_name: "Partner Co".into(),
            contact_person_name: "Lee".into(),
            phone_number: None,
            email_address: Some("LEE@partner.sg".into()),
            contract_file_path: Some("contracts/a.pdf".into()),
            contract_file_name: Some("a.pdf".into()),
            contract_file_size: Some(12),
            contract_mime_type: Some("application/pdf".into()),
            created_at: now,
            updated_at: now,
        };
        let partner = DomainPartner::try_from(row).unwrap();
        let contract = partner.contract.unwrap();
        assert_eq!(contract.file.size, 12);
        assert_eq!(contract.mime_type, "application/pdf");
        assert_eq!(partner.email_address.unwrap().as_str(), "lee@partner.sg");
    }
}
