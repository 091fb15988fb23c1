//! Hand-off of rendered emails to the delivery service.

use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::domain::email::OutgoingEmail;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("zmq error: {0}")]
    Zmq(#[from] zmq::Error),

    #[error("mailer socket is poisoned")]
    Poisoned,
}

/// Delivers a rendered message.
#[cfg_attr(any(test, feature = "test-mocks"), mockall::automock)]
pub trait EmailSender: Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError>;
}

/// Wire format understood by the email delivery service.
#[derive(Debug, Serialize)]
struct SendEmailMessage<'a> {
    recipient: Recipient<'a>,
    subject: &'a str,
    html: &'a str,
    attachments: &'a [String],
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    address: &'a str,
    name: Option<&'a str>,
}

impl<'a> From<&'a OutgoingEmail> for SendEmailMessage<'a> {
    fn from(email: &'a OutgoingEmail) -> Self {
        Self {
            recipient: Recipient {
                address: email.recipient_email.as_str(),
                name: email.recipient_name.as_deref(),
            },
            subject: &email.subject,
            html: &email.body,
            attachments: &email.attachments,
        }
    }
}

/// Publishes JSON messages on a ZeroMQ PUB socket.
pub struct ZmqEmailSender {
    socket: Mutex<zmq::Socket>,
}

impl ZmqEmailSender {
    /// Connects a publisher to the delivery service endpoint.
    pub fn connect(endpoint: &str) -> Result<Self, MailerError> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB)?;
        socket.connect(endpoint)?;
        log::info!("Email publisher connected to {endpoint}");
        Ok(Self {
            socket: Mutex::new(socket),
        })
    }
}

impl EmailSender for ZmqEmailSender {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        let payload = serde_json::to_vec(&SendEmailMessage::from(email))?;
        let socket = self.socket.lock().map_err(|_| MailerError::Poisoned)?;
        socket.send(payload, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ContactEmail;

    #[test]
    fn message_carries_recipient_and_attachments() {
        let email = OutgoingEmail {
            recipient_email: ContactEmail::new("jane@client.com").unwrap(),
            recipient_name: Some("Jane".into()),
            subject: "Quotation Q-2025-0001".into(),
            body: "<p>Hi</p>".into(),
            attachments: vec!["/srv/uploads/quotations/a.docx".into()],
        };
        let json = serde_json::to_value(SendEmailMessage::from(&email)).unwrap();
        assert_eq!(json["recipient"]["address"], "jane@client.com");
        assert_eq!(json["recipient"]["name"], "Jane");
        assert_eq!(json["html"], "<p>Hi</p>");
        assert_eq!(json["attachments"][0], "/srv/uploads/quotations/a.docx");
    }
}
