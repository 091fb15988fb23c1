//! Due date reminders created by the `due_reminders` worker.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::domain::notification::{NewNotification, NotificationType};
use crate::domain::types::UserId;
use crate::repository::{InvoiceReader, NotificationReader, NotificationWriter, QuotationReader};
use crate::services::ServiceResult;

/// A document whose due date falls inside the reminder window.
struct DueDocument {
    related_type: &'static str,
    id: i32,
    number: String,
    owner: UserId,
    due_date: NaiveDateTime,
}

fn notify_once<R>(repo: &R, document: &DueDocument, now: NaiveDateTime) -> ServiceResult<bool>
where
    R: NotificationReader + NotificationWriter + ?Sized,
{
    let start_of_day = now.date().and_time(NaiveTime::MIN);
    if repo.notification_exists(
        document.owner,
        NotificationType::DueReminder,
        document.related_type,
        document.id,
        start_of_day,
    )? {
        return Ok(false);
    }

    let title = format!("{} due soon", document.number);
    let message = format!(
        "{} {} is due on {}.",
        capitalize(document.related_type),
        document.number,
        document.due_date.format("%d/%m/%Y")
    );
    let notification =
        NewNotification::new(document.owner, NotificationType::DueReminder, title, message)
            .related(document.related_type, document.id);
    repo.create_notification(&notification)?;
    Ok(true)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Notifies document creators about pending quotations and unpaid invoices
/// due within `days` of `now`. Overdue documents are left alone and each
/// document gets at most one reminder per day. Returns the number of
/// notifications created.
pub fn create_due_reminders<R>(repo: &R, now: NaiveDateTime, days: i64) -> ServiceResult<usize>
where
    R: QuotationReader + InvoiceReader + NotificationReader + NotificationWriter + ?Sized,
{
    let until = now + Duration::days(days);

    let quotations = repo.list_due_quotations(now, until)?.into_iter().filter_map(|q| {
        Some(DueDocument {
            related_type: "quotation",
            id: q.id.get(),
            due_date: q.due_date?,
            number: q.quotation_number,
            owner: q.created_by,
        })
    });
    let invoices = repo.list_due_invoices(now, until)?.into_iter().filter_map(|i| {
        Some(DueDocument {
            related_type: "invoice",
            id: i.id.get(),
            due_date: i.due_date?,
            number: i.invoice_number,
            owner: i.created_by,
        })
    });

    let mut created = 0;
    for document in quotations.chain(invoices) {
        match notify_once(repo, &document, now) {
            Ok(true) => created += 1,
            Ok(false) => {
                log::debug!("Reminder for {} already sent today", document.number);
            }
            Err(err) => {
                log::error!("Failed to create reminder for {}: {err}", document.number);
            }
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::Contact;
    use crate::domain::invoice::{Invoice, InvoiceStatus};
    use crate::domain::notification::Notification;
    use crate::domain::quotation::{Quotation, QuotationStatus};
    use crate::domain::types::{
        ClientId, ContactEmail, InvoiceId, NotificationId, PersonName, QuotationId, TemplateId,
    };
    use crate::repository::mock::MockRepository;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn contact() -> Contact {
        Contact {
            name: PersonName::new("Jane").unwrap(),
            email: ContactEmail::new("jane@acme.com").unwrap(),
            phone: None,
        }
    }

    fn quotation() -> Quotation {
        Quotation {
            id: QuotationId::new(4).unwrap(),
            quotation_number: "Q-2025-0004".into(),
            client_id: ClientId::new(1).unwrap(),
            selected_contact: contact(),
            template_id: TemplateId::new(1).unwrap(),
            my_company_info: None,
            file: None,
            due_date: Some(now() + Duration::days(2)),
            status: QuotationStatus::Pending,
            created_by: UserId::new(7).unwrap(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn invoice() -> Invoice {
        Invoice {
            id: InvoiceId::new(9).unwrap(),
            invoice_number: "INV-2025-0009".into(),
            quotation_id: QuotationId::new(4).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            selected_contact: contact(),
            template_id: TemplateId::new(2).unwrap(),
            my_company_info: None,
            file: None,
            due_date: Some(now() + Duration::days(1)),
            status: InvoiceStatus::Unpaid,
            created_by: UserId::new(7).unwrap(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn stored(new: &NewNotification) -> Notification {
        Notification {
            id: NotificationId::new(1).unwrap(),
            user_id: new.user_id,
            title: new.title.clone(),
            message: new.message.clone(),
            notification_type: new.notification_type,
            related_type: new.related_type.clone(),
            related_id: new.related_id,
            is_read: false,
            read_at: None,
            created_at: now(),
        }
    }

    #[test]
    fn reminders_are_created_for_each_due_document() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_quotations()
            .returning(|_, _| Ok(vec![quotation()]));
        repo.expect_list_due_invoices().returning(|_, _| Ok(vec![invoice()]));
        repo.expect_notification_exists()
            .returning(|_, _, _, _, _| Ok(false));
        repo.expect_create_notification()
            .times(2)
            .returning(|new| Ok(stored(new)));

        assert_eq!(create_due_reminders(&repo, now(), 3).unwrap(), 2);
    }

    #[test]
    fn documents_already_reminded_today_are_skipped() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_quotations()
            .returning(|_, _| Ok(vec![quotation()]));
        repo.expect_list_due_invoices().returning(|_, _| Ok(vec![]));
        repo.expect_notification_exists()
            .withf(|_, kind, related, id, since| {
                *kind == NotificationType::DueReminder
                    && related == "quotation"
                    && *id == 4
                    && *since == now().date().and_time(chrono::NaiveTime::MIN)
            })
            .returning(|_, _, _, _, _| Ok(true));
        repo.expect_create_notification().never();

        assert_eq!(create_due_reminders(&repo, now(), 3).unwrap(), 0);
    }

    #[test]
    fn reminder_message_names_the_document() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_quotations().returning(|_, _| Ok(vec![]));
        repo.expect_list_due_invoices().returning(|_, _| Ok(vec![invoice()]));
        repo.expect_notification_exists()
            .returning(|_, _, _, _, _| Ok(false));
        repo.expect_create_notification()
            .withf(|new| {
                new.message == "Invoice INV-2025-0009 is due on 11/06/2025."
                    && new.related_id == Some(9)
            })
            .returning(|new| Ok(stored(new)));

        assert_eq!(create_due_reminders(&repo, now(), 3).unwrap(), 1);
    }

    #[test]
    fn overdue_documents_are_not_reminded() {
        let mut repo = MockRepository::new();
        repo.expect_list_due_quotations()
            .withf(|after, until| *after == now() && *until == now() + Duration::days(3))
            .returning(|_, _| Ok(vec![]));
        repo.expect_list_due_invoices()
            .withf(|after, _| *after == now())
            .returning(|_, _| Ok(vec![]));
        repo.expect_notification_exists().never();
        repo.expect_create_notification().never();

        assert_eq!(create_due_reminders(&repo, now(), 3).unwrap(), 0);
    }
}
