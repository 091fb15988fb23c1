use serde::Deserialize;
use validator::Validate;

use crate::domain::company::UpdateCompanySettings;
use crate::domain::types::{ContactEmail, normalize_phone_to_e164, trimmed_opt};
use crate::forms::FormError;

#[derive(Debug, Default, Deserialize, Validate)]
/// Form data of the company settings page. Every field is optional.
pub struct CompanySettingsForm {
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    #[validate(length(max = 1000))]
    pub company_address: Option<String>,
    #[validate(url)]
    pub company_website: Option<String>,
}

impl TryFrom<CompanySettingsForm> for UpdateCompanySettings {
    type Error = FormError;

    fn try_from(form: CompanySettingsForm) -> Result<Self, Self::Error> {
        let website = trimmed_opt(form.company_website.clone());
        let form = CompanySettingsForm {
            company_website: website,
            ..form
        };
        form.validate()?;

        let company_email = trimmed_opt(form.company_email)
            .map(|email| ContactEmail::new(email).map_err(|_| FormError::InvalidEmail))
            .transpose()?
            .map(ContactEmail::into_inner);
        let company_phone = trimmed_opt(form.company_phone)
            .map(|phone| {
                normalize_phone_to_e164(&phone).map_err(|_| FormError::InvalidPhoneNumber)
            })
            .transpose()?;

        Ok(UpdateCompanySettings {
            company_name: trimmed_opt(form.company_name),
            company_email,
            company_phone,
            company_address: trimmed_opt(form.company_address),
            company_website: form.company_website,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_cleared() {
        let form = CompanySettingsForm {
            company_name: Some(" Acme Pte Ltd ".into()),
            company_email: Some("".into()),
            company_website: Some("  ".into()),
            ..CompanySettingsForm::default()
        };
        let settings = UpdateCompanySettings::try_from(form).unwrap();
        assert_eq!(settings.company_name.as_deref(), Some("Acme Pte Ltd"));
        assert_eq!(settings.company_email, None);
        assert_eq!(settings.company_website, None);
    }

    #[test]
    fn contact_details_are_normalised() {
        let form = CompanySettingsForm {
            company_email: Some("Sales@Acme.sg".into()),
            company_phone: Some("6123 4567".into()),
            company_website: Some("https://acme.sg".into()),
            ..CompanySettingsForm::default()
        };
        let settings = UpdateCompanySettings::try_from(form).unwrap();
        assert_eq!(settings.company_email.as_deref(), Some("sales@acme.sg"));
        assert_eq!(settings.company_phone.as_deref(), Some("+6561234567"));
    }

    #[test]
    fn invalid_website_is_rejected() {
        let form = CompanySettingsForm {
            company_website: Some("not a url".into()),
            ..CompanySettingsForm::default()
        };
        assert!(matches!(
            UpdateCompanySettings::try_from(form),
            Err(FormError::Validation(_))
        ));
    }
}
