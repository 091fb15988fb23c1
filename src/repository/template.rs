//! Repository implementation for document templates.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::document::StoredFile;
use crate::domain::template::{NewTemplate, Template, UpdateTemplate};
use crate::domain::types::TemplateId;
use crate::models::template::{
    NewTemplate as DbNewTemplate, Template as DbTemplate, UpdateTemplate as DbUpdateTemplate,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, TemplateListQuery, TemplateReader, TemplateWriter, like_pattern,
};

impl TemplateReader for DieselRepository {
    fn get_template_by_id(&self, id: TemplateId) -> RepositoryResult<Option<Template>> {
        use crate::schema::templates;

        let mut conn = self.conn()?;
        templates::table
            .find(id.get())
            .first::<DbTemplate>(&mut conn)
            .optional()?
            .map(Template::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_templates(
        &self,
        query: TemplateListQuery,
    ) -> RepositoryResult<(usize, Vec<Template>)> {
        use crate::schema::templates;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: templates::BoxedQuery<'_, Sqlite> = templates::table.into_boxed();
            if let Some(term) = &query.search {
                let pattern = like_pattern(term);
                items = items.filter(
                    templates::name
                        .like(pattern.clone())
                        .or(templates::description.like(pattern)),
                );
            }
            if let Some(template_type) = query.template_type {
                items = items.filter(templates::template_type.eq(template_type.as_str()));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered().order(templates::created_at.desc()).then_order_by(templates::id.desc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let templates = items
            .load::<DbTemplate>(&mut conn)?
            .into_iter()
            .map(Template::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, templates))
    }
}

impl TemplateWriter for DieselRepository {
    fn create_template(&self, new_template: &NewTemplate) -> RepositoryResult<Template> {
        use crate::schema::templates;

        let mut conn = self.conn()?;
        let db_template = diesel::insert_into(templates::table)
            .values(DbNewTemplate::from(new_template))
            .get_result::<DbTemplate>(&mut conn)?;

        Template::try_from(db_template).map_err(RepositoryError::from)
    }

    fn update_template(
        &self,
        id: TemplateId,
        updates: &UpdateTemplate,
    ) -> RepositoryResult<Template> {
        use crate::schema::templates;

        let mut conn = self.conn()?;
        let db_template = diesel::update(templates::table.find(id.get()))
            .set(DbUpdateTemplate::from(updates))
            .get_result::<DbTemplate>(&mut conn)?;

        Template::try_from(db_template).map_err(RepositoryError::from)
    }

    fn set_template_file(&self, id: TemplateId, file: &StoredFile) -> RepositoryResult<Template> {
        use crate::schema::templates;

        let mut conn = self.conn()?;
        let db_template = diesel::update(templates::table.find(id.get()))
            .set((
                templates::file_path.eq(file.path.as_str()),
                templates::file_name.eq(file.name.as_str()),
                templates::file_size.eq(file.size),
                templates::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<DbTemplate>(&mut conn)?;

        Template::try_from(db_template).map_err(RepositoryError::from)
    }

    fn delete_template(&self, id: TemplateId) -> RepositoryResult<()> {
        use crate::schema::templates;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(templates::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
