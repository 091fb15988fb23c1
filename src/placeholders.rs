//! `{{variable}}` substitution for email subjects and bodies.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};

use crate::domain::client::{Client, Contact};
use crate::domain::company::CompanyInfo;
use crate::domain::invoice::Invoice;
use crate::domain::quotation::Quotation;

/// Variable name to replacement text.
pub type Variables = BTreeMap<String, String>;

/// Names offered on the email template editor.
pub const AVAILABLE_VARIABLES: &[&str] = &[
    "current_date",
    "client_company_name",
    "client_uen",
    "client_industry",
    "client_address",
    "client_postal_code",
    "contact_name",
    "contact_email",
    "contact_phone",
    "my_company_name",
    "my_company_email",
    "my_company_phone",
    "my_company_address",
    "my_company_website",
    "quotation_number",
    "quotation_date",
    "quotation_status",
    "invoice_number",
    "invoice_date",
    "invoice_status",
    "due_date",
];

static PLACEHOLDER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}"));

fn placeholder() -> Option<&'static Regex> {
    match PLACEHOLDER.as_ref() {
        Ok(re) => Some(re),
        Err(e) => {
            log::error!("Invalid placeholder pattern: {e}");
            None
        }
    }
}

/// Replaces every `{{name}}` whose `name` is in `variables`.
///
/// Tokens without a mapping are left exactly as written.
pub fn substitute(text: &str, variables: &Variables) -> String {
    let Some(re) = placeholder() else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures<'_>| match variables.get(&caps[1]) {
        Some(value) => value.clone(),
        None => caps[0].to_string(),
    })
    .into_owned()
}

/// Unique placeholder names in order of first appearance.
pub fn extract_variables(text: &str) -> Vec<String> {
    let Some(re) = placeholder() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    re.captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn format_date(value: NaiveDateTime) -> String {
    value.format("%d/%m/%Y").to_string()
}

fn insert(variables: &mut Variables, key: &str, value: impl Into<String>) {
    variables.insert(key.to_string(), value.into());
}

fn client_variables(variables: &mut Variables, client: &Client) {
    insert(variables, "client_company_name", client.company_name.as_str());
    insert(variables, "client_uen", client.uen.clone().unwrap_or_default());
    insert(variables, "client_industry", client.industry.clone().unwrap_or_default());
    insert(variables, "client_address", client.address.clone().unwrap_or_default());
    insert(variables, "client_postal_code", client.postal_code.clone().unwrap_or_default());
}

fn contact_variables(variables: &mut Variables, contact: &Contact) {
    let phone = contact
        .phone
        .as_ref()
        .map(|phone| phone.as_str().to_string())
        .unwrap_or_default();
    for prefix in ["contact", "client"] {
        insert(variables, &format!("{prefix}_name"), contact.name.as_str());
        insert(variables, &format!("{prefix}_email"), contact.email.as_str());
        insert(variables, &format!("{prefix}_phone"), phone.clone());
    }
}

fn company_variables(variables: &mut Variables, company: &CompanyInfo) {
    insert(variables, "my_company_name", company.name.as_str());
    insert(variables, "my_company_email", company.email.as_str());
    insert(variables, "my_company_phone", company.phone.as_str());
    insert(variables, "my_company_address", company.address.as_str());
    insert(variables, "my_company_website", company.website.as_str());
}

/// Variables available to every email.
pub fn base_variables(today: NaiveDate) -> Variables {
    let mut variables = Variables::new();
    insert(&mut variables, "current_date", today.format("%d/%m/%Y").to_string());
    variables
}

/// Variables describing a quotation, its client and the sender company.
///
/// `company` falls back to the current settings when the quotation carries
/// no snapshot.
pub fn quotation_variables(
    quotation: &Quotation,
    client: Option<&Client>,
    company: Option<&CompanyInfo>,
    today: NaiveDate,
) -> Variables {
    let mut variables = base_variables(today);
    if let Some(client) = client {
        client_variables(&mut variables, client);
    }
    contact_variables(&mut variables, &quotation.selected_contact);
    if let Some(company) = quotation.my_company_info.as_ref().or(company) {
        company_variables(&mut variables, company);
    }
    insert(&mut variables, "quotation_number", quotation.quotation_number.as_str());
    insert(&mut variables, "quotation_date", format_date(quotation.created_at));
    insert(&mut variables, "quotation_status", quotation.status.as_str());
    insert(
        &mut variables,
        "due_date",
        quotation.due_date.map(format_date).unwrap_or_default(),
    );
    variables
}

/// Variables describing an invoice, its client and the sender company.
pub fn invoice_variables(
    invoice: &Invoice,
    client: Option<&Client>,
    company: Option<&CompanyInfo>,
    today: NaiveDate,
) -> Variables {
    let mut variables = base_variables(today);
    if let Some(client) = client {
        client_variables(&mut variables, client);
    }
    contact_variables(&mut variables, &invoice.selected_contact);
    if let Some(company) = invoice.my_company_info.as_ref().or(company) {
        company_variables(&mut variables, company);
    }
    insert(&mut variables, "invoice_number", invoice.invoice_number.as_str());
    insert(&mut variables, "invoice_date", format_date(invoice.created_at));
    insert(&mut variables, "invoice_status", invoice.status.as_str());
    insert(
        &mut variables,
        "due_date",
        invoice.due_date.map(format_date).unwrap_or_default(),
    );
    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mapped_tokens_are_replaced() {
        let variables = vars(&[("client_name", "Jane"), ("quotation_number", "Q-2025-0001")]);
        assert_eq!(
            substitute("Dear {{client_name}}, see {{ quotation_number }}.", &variables),
            "Dear Jane, see Q-2025-0001."
        );
    }

    #[test]
    fn unmapped_tokens_stay_literal() {
        let variables = vars(&[("client_name", "Jane")]);
        assert_eq!(
            substitute("Hi {{client_name}} {{unknown}} {{ spaced }}", &variables),
            "Hi Jane {{unknown}} {{ spaced }}"
        );
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let variables = vars(&[("x", "1")]);
        assert_eq!(substitute("{{x}}-{{x}}-{{x}}", &variables), "1-1-1");
    }

    #[test]
    fn variables_are_unique_in_first_seen_order() {
        assert_eq!(
            extract_variables("{{b}} {{a}} {{ b }} {{c}} {not} {{bad-name}}"),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn current_date_uses_day_month_year() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(base_variables(today)["current_date"], "07/03/2025");
    }
}
