//! Diesel models for client companies.
//!
//! Contacts are kept as a JSON array in the `contacts` column.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::domain::client::{Client as DomainClient, Contact, NewClient as DomainNewClient};
use crate::domain::types::{ClientId, CompanyName, PartnerId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub company_name: String,
    pub uen: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub contacts: String,
    pub partner_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row returned by raw lookups over the contacts JSON.
#[derive(QueryableByName)]
pub struct ClientIdRow {
    #[diesel(sql_type = Integer)]
    pub id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub company_name: &'a str,
    pub uen: Option<&'a str>,
    pub industry: Option<&'a str>,
    pub address: Option<&'a str>,
    pub postal_code: Option<&'a str>,
    pub contacts: String,
    pub partner_id: Option<i32>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub company_name: &'a str,
    pub uen: Option<&'a str>,
    pub industry: Option<&'a str>,
    pub address: Option<&'a str>,
    pub postal_code: Option<&'a str>,
    pub contacts: String,
    pub partner_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        let contacts: Vec<Contact> = serde_json::from_str(&client.contacts)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("contacts: {e}")))?;
        Ok(Self {
            id: ClientId::try_from(client.id)?,
            company_name: CompanyName::new(client.company_name)?,
            uen: client.uen,
            industry: client.industry,
            address: client.address,
            postal_code: client.postal_code,
            contacts,
            partner_id: client.partner_id.map(PartnerId::try_from).transpose()?,
            created_at: client.created_at,
            updated_at: client.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewClient> for NewClient<'a> {
    type Error = serde_json::Error;

    fn try_from(client: &'a DomainNewClient) -> Result<Self, Self::Error> {
        Ok(Self {
            company_name: client.company_name.as_str(),
            uen: client.uen.as_deref(),
            industry: client.industry.as_deref(),
            address: client.address.as_deref(),
            postal_code: client.postal_code.as_deref(),
            contacts: serde_json::to_string(&client.contacts)?,
            partner_id: client.partner_id.map(PartnerId::get),
        })
    }
}

impl<'a> TryFrom<&'a DomainNewClient> for UpdateClient<'a> {
    type Error = serde_json::Error;

    fn try_from(client: &'a DomainNewClient) -> Result<Self, Self::Error> {
        let new = NewClient::try_from(client)?;
        Ok(Self {
            company_name: new.company_name,
            uen: new.uen,
            industry: new.industry,
            address: new.address,
            postal_code: new.postal_code,
            contacts: new.contacts,
            partner_id: new.partner_id,
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ContactEmail, PersonName, PhoneNumber};

    fn sample_domain_new() -> DomainNewClient {
        DomainNewClient {
            company_name: CompanyName::new("Acme").unwrap(),
            uen: Some("201912345A".into()),
            industry: Some("Logistics".into()),
            address: None,
            postal_code: None,
            contacts: vec![Contact {
                name: PersonName::new("Jane").unwrap(),
                email: ContactEmail::new("jane@acme.sg").unwrap(),
                phone: Some(PhoneNumber::new("+65 6123 4567").unwrap()),
            }],
            partner_id: Some(PartnerId::new(3).unwrap()),
        }
    }

    #[test]
    fn contacts_are_stored_as_json() {
        let domain = sample_domain_new();
        let new = NewClient::try_from(&domain).unwrap();
        assert_eq!(
            new.contacts,
            r#"[{"name":"Jane","email":"jane@acme.sg","phone":"+6561234567"}]"#
        );
        assert_eq!(new.partner_id, Some(3));
    }

    #[test]
    fn row_into_domain_parses_contacts() {
        let now = chrono::Utc::now().naive_utc();
        let row = Client {
            id: 1,
            company_name: "Acme".into(),
            uen: None,
            industry: None,
            address: None,
            postal_code: None,
            contacts: r#"[{"name":"Jane","email":"jane@acme.sg"}]"#.into(),
            partner_id: None,
            created_at: now,
            updated_at: now,
        };
        let domain = DomainClient::try_from(row).unwrap();
        assert_eq!(domain.contacts.len(), 1);
        assert_eq!(domain.contacts[0].phone, None);
    }

    #[test]
    fn broken_contacts_json_is_rejected() {
        let now = chrono::Utc::now().naive_utc();
        let row = Client {
            id: 1,
            company_name: "Acme".into(),
            uen: None,
            industry: None,
            address: None,
            postal_code: None,
            contacts: "not json".into(),
            partner_id: None,
            created_at: now,
            updated_at: now,
        };
        assert!(DomainClient::try_from(row).is_err());
    }
}
