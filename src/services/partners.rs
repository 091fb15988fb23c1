//! Services backing the partner pages and partner contracts.

use crate::ADMIN_ROLES;
use crate::domain::partner::{ContractFile, NewPartner, Partner};
use crate::domain::types::PartnerId;
use crate::dto::partners::{PartnerPageData, PartnersPageData};
use crate::dto::{FileDownload, ListQuery};
use crate::forms::partners::{PartnerForm, UploadContractForm};
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ClientListQuery, ClientReader, PartnerListQuery, PartnerReader, PartnerWriter,
};
use crate::services::{ServiceError, ServiceResult, delete_conflict, storage_failure};
use crate::storage::{FileStorage, Folder};

fn ensure_email_available<R>(
    repo: &R,
    partner: &NewPartner,
    exclude: Option<PartnerId>,
) -> ServiceResult<()>
where
    R: PartnerReader + ?Sized,
{
    let Some(email) = &partner.email_address else {
        return Ok(());
    };
    match repo.get_partner_by_email(email)? {
        Some(other) if Some(other.id) != exclude => Err(ServiceError::Conflict(format!(
            "A partner with email {email} already exists"
        ))),
        _ => Ok(()),
    }
}

fn load_partner<R>(repo: &R, partner_id: i32) -> ServiceResult<Partner>
where
    R: PartnerReader + ?Sized,
{
    repo.get_partner_by_id(PartnerId::new(partner_id)?)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_partners<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<PartnersPageData>
where
    R: PartnerReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let page = query.page();
    let mut list_query = PartnerListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = query.search() {
        list_query = list_query.search(search);
    }
    let (total, partners) = repo.list_partners(list_query)?;

    Ok(PartnersPageData {
        partners: Paginated::new(partners, page, total),
        search: query.search().map(str::to_string),
    })
}

pub fn get_partner<R>(
    repo: &R,
    user: &AuthenticatedUser,
    partner_id: i32,
) -> ServiceResult<PartnerPageData>
where
    R: PartnerReader + ClientReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let partner = load_partner(repo, partner_id)?;
    let (_, clients) = repo.list_clients(ClientListQuery::new().partner(partner.id))?;

    Ok(PartnerPageData { partner, clients })
}

pub fn create_partner<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: PartnerForm,
) -> ServiceResult<Partner>
where
    R: PartnerReader + PartnerWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let new_partner = NewPartner::try_from(form)?;
    ensure_email_available(repo, &new_partner, None)?;

    Ok(repo.create_partner(&new_partner)?)
}

pub fn update_partner<R>(
    repo: &R,
    user: &AuthenticatedUser,
    partner_id: i32,
    form: PartnerForm,
) -> ServiceResult<Partner>
where
    R: PartnerReader + PartnerWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let partner = load_partner(repo, partner_id)?;
    let updates = NewPartner::try_from(form)?;
    ensure_email_available(repo, &updates, Some(partner.id))?;

    Ok(repo.update_partner(partner.id, &updates)?)
}

/// Deletes the partner; clients referring to it lose the reference.
pub fn delete_partner<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    partner_id: i32,
) -> ServiceResult<()>
where
    R: PartnerReader + PartnerWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let partner = load_partner(repo, partner_id)?;
    repo.delete_partner(partner.id)
        .map_err(delete_conflict("partner"))?;
    if let Some(contract) = &partner.contract {
        storage.discard(&contract.file);
    }
    Ok(())
}

/// Stores an uploaded contract and replaces the previous one.
pub fn upload_contract<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    partner_id: i32,
    form: &UploadContractForm,
) -> ServiceResult<Partner>
where
    R: PartnerReader + PartnerWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let partner = load_partner(repo, partner_id)?;
    let (name, mime_type) = form.accepted()?;

    let file = storage
        .save_upload(Folder::Contracts, form.contract.file.path(), &name)
        .map_err(storage_failure("store contract"))?;
    let contract = ContractFile {
        file,
        mime_type: mime_type.to_string(),
    };

    match repo.set_partner_contract(partner.id, &contract) {
        Ok(updated) => {
            if let Some(previous) = &partner.contract {
                storage.discard(&previous.file);
            }
            Ok(updated)
        }
        Err(err) => {
            storage.discard(&contract.file);
            Err(err.into())
        }
    }
}

pub fn contract_download<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    partner_id: i32,
) -> ServiceResult<FileDownload>
where
    R: PartnerReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let partner = load_partner(repo, partner_id)?;
    let contract = partner.contract.ok_or(ServiceError::NotFound)?;
    let path = storage
        .resolve(&contract.file.path)
        .map_err(storage_failure("locate file"))?;

    Ok(FileDownload {
        path,
        name: contract.file.name,
        mime_type: contract.mime_type,
    })
}
