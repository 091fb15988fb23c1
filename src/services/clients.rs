//! Services backing the client pages, the CSV import and the clients API.

use std::collections::HashSet;

use crate::ADMIN_ROLES;
use crate::domain::client::{Client, NewClient};
use crate::domain::types::{ClientId, PartnerId};
use crate::dto::ListQuery;
use crate::dto::clients::{ClientPageData, ClientsPageData, ClientsResponse};
use crate::forms::clients::ClientForm;
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, PartnerListQuery, PartnerReader,
    QuotationListQuery, QuotationReader,
};
use crate::services::{ServiceError, ServiceResult, delete_conflict};

fn decode_form(form: &[u8]) -> ServiceResult<NewClient> {
    let form: ClientForm = serde_html_form::from_bytes(form).map_err(|err| {
        log::error!("Failed to decode client form: {err}");
        ServiceError::Form("Invalid client form".to_string())
    })?;
    Ok(NewClient::try_from(form)?)
}

/// Rejects contacts whose email already belongs to another client.
fn ensure_contacts_available<R>(
    repo: &R,
    client: &NewClient,
    exclude: Option<ClientId>,
) -> ServiceResult<()>
where
    R: ClientReader + ?Sized,
{
    for contact in &client.contacts {
        if repo
            .find_client_by_contact_email(&contact.email, exclude)?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Contact email {} is already used by another client",
                contact.email
            )));
        }
    }
    Ok(())
}

fn ensure_partner_exists<R>(repo: &R, partner_id: Option<PartnerId>) -> ServiceResult<()>
where
    R: PartnerReader + ?Sized,
{
    match partner_id {
        Some(id) if repo.get_partner_by_id(id)?.is_none() => {
            Err(ServiceError::Form("Unknown partner".to_string()))
        }
        _ => Ok(()),
    }
}

fn all_partners<R>(repo: &R) -> ServiceResult<Vec<crate::domain::partner::Partner>>
where
    R: PartnerReader + ?Sized,
{
    let (_, partners) = repo.list_partners(PartnerListQuery::new())?;
    Ok(partners)
}

fn client_list_query(query: &ListQuery) -> ClientListQuery {
    let mut list_query = ClientListQuery::new().paginate(query.page(), DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = query.search() {
        list_query = list_query.search(search);
    }
    if let Some(industry) = query.industry() {
        list_query = list_query.industry(industry);
    }
    list_query
}

pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<ClientsPageData>
where
    R: ClientReader + PartnerReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let (total, clients) = repo.list_clients(client_list_query(query))?;

    Ok(ClientsPageData {
        clients: Paginated::new(clients, query.page(), total),
        industries: repo.list_client_industries()?,
        partners: all_partners(repo)?,
        search: query.search().map(str::to_string),
        industry: query.industry().map(str::to_string),
    })
}

pub fn get_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<ClientPageData>
where
    R: ClientReader + PartnerReader + QuotationReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let client = repo
        .get_client_by_id(ClientId::new(client_id)?)?
        .ok_or(ServiceError::NotFound)?;

    let partner = match client.partner_id {
        Some(id) => repo.get_partner_by_id(id)?,
        None => None,
    };
    let (_, quotations) = repo.list_quotations(QuotationListQuery::new().client(client.id))?;

    Ok(ClientPageData {
        client,
        partner,
        partners: all_partners(repo)?,
        quotations,
    })
}

/// Decodes and validates the url-encoded client form, then creates the client.
pub fn create_client<R>(repo: &R, user: &AuthenticatedUser, form: &[u8]) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + PartnerReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let new_client = decode_form(form)?;
    ensure_partner_exists(repo, new_client.partner_id)?;
    ensure_contacts_available(repo, &new_client, None)?;

    let client = repo.create_client(&new_client)?;
    log::info!("Client {} created by {}", client.id, user.email);
    Ok(client)
}

pub fn update_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: &[u8],
) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + PartnerReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let client_id = ClientId::new(client_id)?;
    let updates = decode_form(form)?;
    repo.get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound)?;
    ensure_partner_exists(repo, updates.partner_id)?;
    ensure_contacts_available(repo, &updates, Some(client_id))?;

    Ok(repo.update_client(client_id, &updates)?)
}

pub fn delete_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    repo.delete_client(ClientId::new(client_id)?)
        .map_err(delete_conflict("client"))?;
    log::info!("Client {client_id} deleted by {}", user.email);
    Ok(())
}

/// Imports clients parsed from an uploaded CSV file.
///
/// Rows whose contacts already belong to a stored client, or to an earlier
/// row of the same file, are skipped.
pub fn import_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    clients: Vec<NewClient>,
) -> ServiceResult<usize>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let mut accepted_emails = HashSet::new();
    let mut fresh = Vec::with_capacity(clients.len());
    for client in clients {
        let emails: Vec<String> = client
            .contacts
            .iter()
            .map(|contact| contact.email.as_str().to_lowercase())
            .collect();
        if let Some(repeated) = emails.iter().find(|email| accepted_emails.contains(*email)) {
            log::info!(
                "Skipping imported client {}: contact email {repeated} appears earlier in the file",
                client.company_name
            );
            continue;
        }
        match ensure_contacts_available(repo, &client, None) {
            Ok(()) => {
                accepted_emails.extend(emails);
                fresh.push(client);
            }
            Err(ServiceError::Conflict(reason)) => {
                log::info!("Skipping imported client {}: {reason}", client.company_name);
            }
            Err(err) => return Err(err),
        }
    }

    if fresh.is_empty() {
        return Ok(0);
    }
    Ok(repo.create_clients(&fresh)?)
}

/// Page of clients for `/api/v1/clients`.
pub fn api_list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<ClientsResponse>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let (total, clients) = repo.list_clients(client_list_query(query))?;

    Ok(ClientsResponse {
        total,
        page: query.page(),
        clients,
    })
}
