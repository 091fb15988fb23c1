//! Repository implementation for email templates and the email audit log.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::email::{
    EmailHistory, EmailTemplate, EmailTemplateType, NewEmailHistory, NewEmailTemplate,
    UpdateEmailTemplate,
};
use crate::domain::types::{EmailHistoryId, EmailTemplateId};
use crate::models::email::{
    EmailHistory as DbEmailHistory, EmailTemplate as DbEmailTemplate,
    NewEmailHistory as DbNewEmailHistory, NewEmailTemplate as DbNewEmailTemplate,
    UpdateEmailTemplate as DbUpdateEmailTemplate,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, EmailHistoryListQuery, EmailHistoryReader, EmailHistoryWriter,
    EmailTemplateListQuery, EmailTemplateReader, EmailTemplateWriter, like_pattern,
};

/// Drops the default flag from every template of `template_type` except `keep`.
fn clear_defaults(
    conn: &mut SqliteConnection,
    template_type: EmailTemplateType,
    keep: Option<i32>,
) -> QueryResult<usize> {
    use crate::schema::email_templates;

    diesel::update(
        email_templates::table
            .filter(email_templates::template_type.eq(template_type.as_str()))
            .filter(email_templates::is_default.eq(true))
            .filter(email_templates::id.ne(keep.unwrap_or(0))),
    )
    .set(email_templates::is_default.eq(false))
    .execute(conn)
}

impl EmailTemplateReader for DieselRepository {
    fn get_email_template_by_id(
        &self,
        id: EmailTemplateId,
    ) -> RepositoryResult<Option<EmailTemplate>> {
        use crate::schema::email_templates;

        let mut conn = self.conn()?;
        email_templates::table
            .find(id.get())
            .first::<DbEmailTemplate>(&mut conn)
            .optional()?
            .map(EmailTemplate::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_email_templates(
        &self,
        query: EmailTemplateListQuery,
    ) -> RepositoryResult<(usize, Vec<EmailTemplate>)> {
        use crate::schema::email_templates;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: email_templates::BoxedQuery<'_, Sqlite> =
                email_templates::table.into_boxed();
            if let Some(term) = &query.search {
                let pattern = like_pattern(term);
                items = items.filter(
                    email_templates::name
                        .like(pattern.clone())
                        .or(email_templates::subject.like(pattern)),
                );
            }
            if let Some(template_type) = query.template_type {
                items = items.filter(email_templates::template_type.eq(template_type.as_str()));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered()
            .order(email_templates::is_default.desc())
            .then_order_by(email_templates::name.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let templates = items
            .load::<DbEmailTemplate>(&mut conn)?
            .into_iter()
            .map(EmailTemplate::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, templates))
    }
}

impl EmailTemplateWriter for DieselRepository {
    fn create_email_template(
        &self,
        new_template: &NewEmailTemplate,
    ) -> RepositoryResult<EmailTemplate> {
        use crate::schema::email_templates;

        let insertable = DbNewEmailTemplate::try_from(new_template)?;
        let mut conn = self.conn()?;

        let db_template = conn.transaction::<_, RepositoryError, _>(|conn| {
            if new_template.is_default {
                clear_defaults(conn, new_template.template_type, None)?;
            }
            let template = diesel::insert_into(email_templates::table)
                .values(&insertable)
                .get_result::<DbEmailTemplate>(conn)?;
            Ok(template)
        })?;

        EmailTemplate::try_from(db_template).map_err(RepositoryError::from)
    }

    fn update_email_template(
        &self,
        id: EmailTemplateId,
        updates: &UpdateEmailTemplate,
    ) -> RepositoryResult<EmailTemplate> {
        use crate::schema::email_templates;

        let changeset = DbUpdateEmailTemplate::try_from(updates)?;
        let mut conn = self.conn()?;

        let db_template = conn.transaction::<_, RepositoryError, _>(|conn| {
            if updates.is_default {
                clear_defaults(conn, updates.template_type, Some(id.get()))?;
            }
            let template = diesel::update(email_templates::table.find(id.get()))
                .set(&changeset)
                .get_result::<DbEmailTemplate>(conn)?;
            Ok(template)
        })?;

        EmailTemplate::try_from(db_template).map_err(RepositoryError::from)
    }

    fn delete_email_template(&self, id: EmailTemplateId) -> RepositoryResult<()> {
        use crate::schema::email_templates;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(email_templates::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl EmailHistoryReader for DieselRepository {
    fn get_email_history_by_id(
        &self,
        id: EmailHistoryId,
    ) -> RepositoryResult<Option<EmailHistory>> {
        use crate::schema::email_history;

        let mut conn = self.conn()?;
        email_history::table
            .find(id.get())
            .first::<DbEmailHistory>(&mut conn)
            .optional()?
            .map(EmailHistory::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_email_history(
        &self,
        query: EmailHistoryListQuery,
    ) -> RepositoryResult<(usize, Vec<EmailHistory>)> {
        use crate::schema::email_history;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: email_history::BoxedQuery<'_, Sqlite> =
                email_history::table.into_boxed();
            if let Some(term) = &query.search {
                let pattern = like_pattern(term);
                items = items.filter(
                    email_history::recipient_email
                        .like(pattern.clone())
                        .or(email_history::recipient_name.like(pattern.clone()))
                        .or(email_history::subject.like(pattern.clone()))
                        .or(email_history::document_number.like(pattern)),
                );
            }
            if let Some(status) = query.status {
                items = items.filter(email_history::status.eq(status.as_str()));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered()
            .order(email_history::sent_at.desc())
            .then_order_by(email_history::id.desc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let history = items
            .load::<DbEmailHistory>(&mut conn)?
            .into_iter()
            .map(EmailHistory::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, history))
    }
}

impl EmailHistoryWriter for DieselRepository {
    fn create_email_history(&self, history: &NewEmailHistory) -> RepositoryResult<EmailHistory> {
        use crate::schema::email_history;

        let mut conn = self.conn()?;
        let db_history = diesel::insert_into(email_history::table)
            .values(DbNewEmailHistory::from(history))
            .get_result::<DbEmailHistory>(&mut conn)?;

        EmailHistory::try_from(db_history).map_err(RepositoryError::from)
    }
}
