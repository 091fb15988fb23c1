use std::fs::File;
use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{Contact, NewClient, find_duplicate_email};
use crate::domain::types::{
    CompanyName, ContactEmail, PartnerId, PersonName, PhoneNumber, trimmed_opt,
};
use crate::forms::{FormError, parse_optional_id};

/// Form data for creating or editing a client.
///
/// Contacts arrive as parallel repeated fields (`contact_name`,
/// `contact_email`, `contact_phone`), so the form is decoded with
/// `serde_html_form`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ClientForm {
    #[validate(length(min = 1, max = 255))]
    pub company_name: String,
    #[serde(default)]
    pub uen: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default)]
    pub contact_name: Vec<String>,
    #[serde(default)]
    pub contact_email: Vec<String>,
    #[serde(default)]
    pub contact_phone: Vec<String>,
}

fn parse_phone(raw: Option<&str>) -> Result<Option<PhoneNumber>, FormError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => PhoneNumber::new(value)
            .map(Some)
            .map_err(|_| FormError::InvalidPhoneNumber),
        None => Ok(None),
    }
}

/// Builds a contact from raw input; a completely blank row yields `None`.
fn parse_contact(
    name: &str,
    email: &str,
    phone: Option<&str>,
) -> Result<Option<Contact>, FormError> {
    let phone_blank = phone.is_none_or(|p| p.trim().is_empty());
    if name.trim().is_empty() && email.trim().is_empty() && phone_blank {
        return Ok(None);
    }
    Ok(Some(Contact {
        name: PersonName::new(name)?,
        email: ContactEmail::new(email).map_err(|_| FormError::InvalidEmail)?,
        phone: parse_phone(phone)?,
    }))
}

/// Rejects contact lists that are empty or repeat an email.
fn check_contacts(contacts: &[Contact]) -> Result<(), FormError> {
    if contacts.is_empty() {
        return Err(FormError::NoContacts);
    }
    if let Some(email) = find_duplicate_email(contacts) {
        return Err(FormError::DuplicateEmail(email.to_string()));
    }
    Ok(())
}

impl TryFrom<ClientForm> for NewClient {
    type Error = FormError;

    fn try_from(form: ClientForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let mut contacts = Vec::with_capacity(form.contact_name.len());
        for (index, name) in form.contact_name.iter().enumerate() {
            let email = form.contact_email.get(index).map(String::as_str).unwrap_or("");
            let phone = form.contact_phone.get(index).map(String::as_str);
            if let Some(contact) = parse_contact(name, email, phone)? {
                contacts.push(contact);
            }
        }
        check_contacts(&contacts)?;

        let partner_id = parse_optional_id(form.partner_id.as_deref(), "partner")?
            .map(PartnerId::new)
            .transpose()
            .map_err(|_| FormError::InvalidId("partner"))?;

        Ok(NewClient {
            company_name: CompanyName::new(form.company_name)?,
            uen: trimmed_opt(form.uen),
            industry: trimmed_opt(form.industry),
            address: trimmed_opt(form.address),
            postal_code: trimmed_opt(form.postal_code),
            contacts,
            partner_id,
        })
    }
}

/// Multipart upload carrying a CSV file of clients.
#[derive(MultipartForm)]
pub struct UploadClientsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

/// One row of the client import file.
#[derive(Debug, Deserialize)]
struct ClientCsvRow {
    company_name: String,
    #[serde(default)]
    uen: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    contact_name: String,
    contact_email: String,
    #[serde(default)]
    contact_phone: Option<String>,
}

impl TryFrom<ClientCsvRow> for NewClient {
    type Error = FormError;

    fn try_from(row: ClientCsvRow) -> Result<Self, Self::Error> {
        let contact = parse_contact(
            &row.contact_name,
            &row.contact_email,
            row.contact_phone.as_deref(),
        )?
        .ok_or(FormError::NoContacts)?;

        Ok(NewClient {
            company_name: CompanyName::new(row.company_name)?,
            uen: trimmed_opt(row.uen),
            industry: trimmed_opt(row.industry),
            address: trimmed_opt(row.address),
            postal_code: trimmed_opt(row.postal_code),
            contacts: vec![contact],
            partner_id: None,
        })
    }
}

/// Parses CSV text with the import columns into new clients.
///
/// The first failing row aborts the import; the error names its line.
pub fn parse_clients_csv<R: Read>(reader: R) -> Result<Vec<NewClient>, FormError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut clients = Vec::new();

    for (index, record) in rdr.deserialize::<ClientCsvRow>().enumerate() {
        let line = index + 2;
        let row = record.map_err(|e| FormError::Csv(format!("line {line}: {e}")))?;
        let client = NewClient::try_from(row).map_err(|e| match e {
            FormError::Csv(message) => FormError::Csv(message),
            other => FormError::Csv(format!("line {line}: {other}")),
        })?;
        clients.push(client);
    }

    if clients.is_empty() {
        return Err(FormError::Csv("no clients found".to_string()));
    }
    Ok(clients)
}

impl UploadClientsForm {
    /// Reads the uploaded file and parses it with [`parse_clients_csv`].
    pub fn parse(&self) -> Result<Vec<NewClient>, FormError> {
        let file = File::open(self.csv.file.path()).map_err(|e| FormError::Csv(e.to_string()))?;
        parse_clients_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ClientForm {
        ClientForm {
            company_name: "Acme Pte Ltd".into(),
            industry: Some("  Logistics ".into()),
            partner_id: Some("".into()),
            contact_name: vec!["Jane".into(), "".into()],
            contact_email: vec!["Jane@Acme.sg".into(), "".into()],
            contact_phone: vec!["6123 4567".into(), "".into()],
            ..ClientForm::default()
        }
    }

    #[test]
    fn blank_contact_rows_are_skipped() {
        let client = NewClient::try_from(form()).unwrap();
        assert_eq!(client.contacts.len(), 1);
        assert_eq!(client.contacts[0].email.as_str(), "jane@acme.sg");
        assert_eq!(
            client.contacts[0].phone.as_ref().map(PhoneNumber::as_str),
            Some("+6561234567")
        );
        assert_eq!(client.industry.as_deref(), Some("Logistics"));
        assert_eq!(client.partner_id, None);
    }

    #[test]
    fn duplicate_contact_email_is_rejected() {
        let mut form = form();
        form.contact_name = vec!["Jane".into(), "John".into()];
        form.contact_email = vec!["jane@acme.sg".into(), "JANE@acme.sg".into()];
        form.contact_phone = vec![];
        let err = NewClient::try_from(form).unwrap_err();
        assert!(err.to_string().contains("duplicate email"));
    }

    #[test]
    fn a_contact_is_required() {
        let mut form = form();
        form.contact_name.clear();
        form.contact_email.clear();
        assert!(matches!(
            NewClient::try_from(form),
            Err(FormError::NoContacts)
        ));
    }

    #[test]
    fn repeated_fields_decode_from_urlencoded_body() {
        let body = "company_name=Acme&contact_name=Jane&contact_email=jane%40acme.sg\
                    &contact_phone=&contact_name=John&contact_email=john%40acme.sg&contact_phone=";
        let form: ClientForm = serde_html_form::from_str(body).unwrap();
        assert_eq!(form.contact_name, vec!["Jane", "John"]);
        let client = NewClient::try_from(form).unwrap();
        assert_eq!(client.contacts.len(), 2);
    }

    #[test]
    fn csv_rows_become_clients() {
        let data = "company_name,uen,industry,address,postal_code,contact_name,contact_email,contact_phone\n\
                    Acme,201912345A,Retail,1 Main St,123456,Jane,jane@acme.sg,\n\
                    Globex,,,,,John,john@globex.sg,+6598765432\n";
        let clients = parse_clients_csv(data.as_bytes()).unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].uen.as_deref(), Some("201912345A"));
        assert_eq!(clients[1].industry, None);
    }

    #[test]
    fn csv_errors_name_the_line() {
        let data = "company_name,uen,industry,address,postal_code,contact_name,contact_email,contact_phone\n\
                    Acme,,,,,Jane,not-an-email,\n";
        let err = parse_clients_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
