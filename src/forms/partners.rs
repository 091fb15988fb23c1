use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::partner::{NewPartner, contract_mime_type};
use crate::domain::types::{CompanyName, ContactEmail, PersonName, PhoneNumber};
use crate::forms::FormError;

#[derive(Debug, Default, Deserialize, Validate)]
/// Form data for creating or editing a partner.
pub struct PartnerForm {
    #[validate(length(min = 1, max = 255))]
    pub company_name: String,
    #[validate(length(min = 1, max = 255))]
    pub contact_person_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

impl TryFrom<PartnerForm> for NewPartner {
    type Error = FormError;

    fn try_from(form: PartnerForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let phone_number = match form.phone_number.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => {
                Some(PhoneNumber::new(phone).map_err(|_| FormError::InvalidPhoneNumber)?)
            }
            _ => None,
        };
        let email_address = match form.email_address.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => {
                Some(ContactEmail::new(email).map_err(|_| FormError::InvalidEmail)?)
            }
            _ => None,
        };

        Ok(NewPartner {
            company_name: CompanyName::new(form.company_name)?,
            contact_person_name: PersonName::new(form.contact_person_name)?,
            phone_number,
            email_address,
        })
    }
}

/// Multipart upload of a partner contract.
#[derive(MultipartForm)]
pub struct UploadContractForm {
    #[multipart(limit = "20MB")]
    pub contract: TempFile,
}

impl UploadContractForm {
    /// Original file name and accepted MIME type of the upload.
    pub fn accepted(&self) -> Result<(String, &'static str), FormError> {
        let name = self
            .contract
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or(FormError::MissingFile)?;
        let declared = self
            .contract
            .content_type
            .as_ref()
            .map(|mime| mime.essence_str());
        let mime_type = contract_mime_type(&name, declared).ok_or(FormError::UnsupportedFile)?;
        Ok((name, mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_contact_details_may_be_blank() {
        let form = PartnerForm {
            company_name: "Partner Co".into(),
            contact_person_name: "Pat".into(),
            phone_number: Some(" ".into()),
            email_address: Some("".into()),
        };
        let partner = NewPartner::try_from(form).unwrap();
        assert!(partner.phone_number.is_none());
        assert!(partner.email_address.is_none());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let form = PartnerForm {
            company_name: "Partner Co".into(),
            contact_person_name: "Pat".into(),
            phone_number: None,
            email_address: Some("pat-at-example".into()),
        };
        assert!(matches!(
            NewPartner::try_from(form),
            Err(FormError::InvalidEmail)
        ));
    }

    #[test]
    fn contact_person_is_required() {
        let form = PartnerForm {
            company_name: "Partner Co".into(),
            ..PartnerForm::default()
        };
        assert!(matches!(
            NewPartner::try_from(form),
            Err(FormError::Validation(_))
        ));
    }
}
