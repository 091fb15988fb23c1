//! Repository implementation for the single company settings row.

use diesel::prelude::*;

use crate::domain::company::{CompanySettings, UpdateCompanySettings};
use crate::models::company::{
    CompanySettings as DbCompanySettings, UpsertCompanySettings as DbUpsertCompanySettings,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CompanySettingsReader, CompanySettingsWriter, DieselRepository};

impl CompanySettingsReader for DieselRepository {
    fn get_company_settings(&self) -> RepositoryResult<CompanySettings> {
        use crate::schema::company_settings;

        let mut conn = self.conn()?;
        let settings = company_settings::table
            .order(company_settings::id.asc())
            .first::<DbCompanySettings>(&mut conn)
            .optional()?;

        Ok(settings.map(CompanySettings::from).unwrap_or_default())
    }
}

impl CompanySettingsWriter for DieselRepository {
    fn save_company_settings(
        &self,
        settings: &UpdateCompanySettings,
    ) -> RepositoryResult<CompanySettings> {
        use crate::schema::company_settings;

        let values = DbUpsertCompanySettings::from(settings);
        let mut conn = self.conn()?;

        let saved = conn.transaction::<_, RepositoryError, _>(|conn| {
            let existing = company_settings::table
                .select(company_settings::id)
                .order(company_settings::id.asc())
                .first::<i32>(conn)
                .optional()?;

            let row = match existing {
                Some(id) => diesel::update(company_settings::table.find(id))
                    .set(&values)
                    .get_result::<DbCompanySettings>(conn)?,
                None => diesel::insert_into(company_settings::table)
                    .values(&values)
                    .get_result::<DbCompanySettings>(conn)?,
            };
            Ok(row)
        })?;

        Ok(CompanySettings::from(saved))
    }
}
