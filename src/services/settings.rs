//! Services for the company settings page.

use crate::ADMIN_ROLES;
use crate::domain::company::{CompanySettings, UpdateCompanySettings};
use crate::forms::settings::CompanySettingsForm;
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{CompanySettingsReader, CompanySettingsWriter};
use crate::services::{ServiceResult, log_failure};

pub fn get_settings<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<CompanySettings>
where
    R: CompanySettingsReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    Ok(repo.get_company_settings()?)
}

/// Validates and stores the company settings used on new documents and in
/// email placeholders.
pub fn save_settings<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CompanySettingsForm,
) -> ServiceResult<CompanySettings>
where
    R: CompanySettingsWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let updates = UpdateCompanySettings::try_from(form)?;
    let settings = repo
        .save_company_settings(&updates)
        .map_err(Into::into)
        .map_err(log_failure("save company settings"))?;
    log::info!("Company settings updated by {}", user.email);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::Role;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;

    fn auth(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "admin@example.com".into(),
            name: "Admin".into(),
            role_id: role.id(),
            exp: 0,
        }
    }

    #[test]
    fn settings_are_normalised_before_saving() {
        let mut repo = MockRepository::new();
        repo.expect_save_company_settings()
            .withf(|updates| {
                updates.company_email.as_deref() == Some("hello@acme.com")
                    && updates.company_phone.as_deref() == Some("+6561234567")
            })
            .returning(|updates| {
                Ok(CompanySettings {
                    company_email: updates.company_email.clone(),
                    company_phone: updates.company_phone.clone(),
                    ..CompanySettings::default()
                })
            });

        let form = CompanySettingsForm {
            company_email: Some(" Hello@Acme.com ".into()),
            company_phone: Some("6123 4567".into()),
            ..CompanySettingsForm::default()
        };
        assert!(save_settings(&repo, &auth(Role::Admin), form).is_ok());
    }

    #[test]
    fn invalid_website_never_reaches_repository() {
        let mut repo = MockRepository::new();
        repo.expect_save_company_settings().never();

        let form = CompanySettingsForm {
            company_website: Some("not a url".into()),
            ..CompanySettingsForm::default()
        };
        let result = save_settings(&repo, &auth(Role::Superadmin), form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn plain_users_cannot_read_settings() {
        let repo = MockRepository::new();
        assert!(matches!(
            get_settings(&repo, &auth(Role::User)),
            Err(ServiceError::Forbidden)
        ));
    }
}
