// src/backend/services/notification_service.rs
use crate::{
    error::WillError,
    metrics,
    models::{
        common::{RecipientId, WillId},
        Recipient, Will,
    },
    utils::logging,
};
use candid::CandidType;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

/// A single notification email, ready for the relay.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Stable per (will, finalize round, recipient) so relays can drop replays.
    pub idempotency_key: String,
}

/// Delivers one email. Implemented over HTTP outcalls in production.
#[allow(async_fn_in_trait)]
pub trait EmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), WillError>;
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RecipientNotification {
    pub recipient_id: RecipientId,
    pub email: String,
    pub delivered: bool,
    pub error: Option<String>,
}

/// Outcome of notifying a will's recipients.
///
/// `total` counts only recipients that have an email address.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct NotificationReport {
    pub will_id: WillId,
    pub sent: u32,
    pub total: u32,
    pub results: Vec<RecipientNotification>,
}

impl NotificationReport {
    /// Informational warning when some sends failed; never a hard error.
    pub fn partial_failure(&self) -> Option<WillError> {
        (self.sent < self.total).then_some(WillError::NotificationPartialFailure {
            sent: self.sent,
            total: self.total,
        })
    }
}

/// Builds the email sent to one recipient of a finalized will.
pub fn compose_email(will: &Will, owner_name: &str, recipient: &Recipient, address: &str) -> OutgoingEmail {
    let owner_name = match owner_name.trim() {
        "" => "Someone",
        name => name,
    };
    let title = will.display_title();
    OutgoingEmail {
        to: address.to_string(),
        subject: format!("{} has named you in their last wishes", owner_name),
        body: format!(
            "Dear {},\n\n{} has finalized \"{}\" and listed you as a recipient.\n\
             You will be contacted with further details when the time comes.\n",
            recipient.full_name.trim(),
            owner_name,
            title
        ),
        idempotency_key: format!(
            "will-{}-round-{}-recipient-{}",
            will.will_id, will.finalize_count, recipient.recipient_id
        ),
    }
}

/// Emails every recipient that has an address. Sends run concurrently and a
/// failed send never stops the others.
pub async fn notify<E: EmailSender>(
    sender: &E,
    will: &Will,
    owner_name: &str,
    recipients: &[Recipient],
) -> NotificationReport {
    let targets: Vec<(&Recipient, OutgoingEmail)> = recipients
        .iter()
        .filter_map(|r| {
            r.notification_email()
                .map(|address| (r, compose_email(will, owner_name, r, address)))
        })
        .collect();

    let skipped = recipients.len() - targets.len();
    if skipped > 0 {
        logging::info(format!(
            "Will {}: {} recipient(s) have no email address and were not notified",
            will.will_id, skipped
        ));
    }

    let outcomes = join_all(targets.iter().map(|(_, email)| sender.send(email))).await;

    let results: Vec<RecipientNotification> = targets
        .iter()
        .zip(outcomes)
        .map(|((recipient, email), outcome)| {
            if let Err(e) = &outcome {
                logging::warn(format!(
                    "Will {}: notification to recipient {} failed: {}",
                    will.will_id, recipient.recipient_id, e
                ));
            }
            RecipientNotification {
                recipient_id: recipient.recipient_id,
                email: email.to.clone(),
                delivered: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
            }
        })
        .collect();

    let total = results.len() as u32;
    let sent = results.iter().filter(|r| r.delivered).count() as u32;
    metrics::record_notifications(sent, total - sent);
    logging::info(format!("Will {}: notified {}/{} recipients", will.will_id, sent, total));

    NotificationReport {
        will_id: will.will_id,
        sent,
        total,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::{WillStatus, WillType};
    use crate::services::test_support::{owner, MockEmailSender};
    use futures::executor::block_on;

    fn will() -> Will {
        Will {
            will_id: 7,
            owner: owner(1),
            will_type: WillType::Text,
            status: WillStatus::Completed,
            title: Some("My wishes".to_string()),
            content: Some("Look after the garden.".to_string()),
            transcript: None,
            media_ref: None,
            content_sha256: None,
            created_at: 1,
            updated_at: 2,
            finalized_at: Some(2),
            finalize_count: 1,
        }
    }

    fn recipient(id: RecipientId, email: Option<&str>) -> Recipient {
        Recipient {
            recipient_id: id,
            owner: owner(1),
            full_name: format!("Recipient {}", id),
            email: email.map(str::to_string),
            phone: None,
            relationship: None,
            address: None,
            is_verified: false,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn recipients_without_email_are_not_counted() {
        let sender = MockEmailSender::default();
        let recipients = [recipient(1, Some("a@example.com")), recipient(2, None), recipient(3, Some("  "))];

        let report = block_on(notify(&sender, &will(), "Jane Doe", &recipients));
        assert_eq!((report.sent, report.total), (1, 1));
        assert_eq!(report.partial_failure(), None);
        assert_eq!(sender.recipients(), vec!["a@example.com".to_string()]);
    }

    #[test]
    fn one_failed_send_does_not_stop_the_rest() {
        let sender = MockEmailSender::failing_for("b@example.com");
        let recipients = [
            recipient(1, Some("a@example.com")),
            recipient(2, Some("b@example.com")),
            recipient(3, Some("c@example.com")),
        ];

        let report = block_on(notify(&sender, &will(), "Jane Doe", &recipients));
        assert_eq!((report.sent, report.total), (2, 3));
        assert_eq!(
            report.partial_failure(),
            Some(WillError::NotificationPartialFailure { sent: 2, total: 3 })
        );
        let failed = report.results.iter().find(|r| !r.delivered).unwrap();
        assert_eq!(failed.recipient_id, 2);
        assert!(failed.error.is_some());
    }

    #[test]
    fn no_recipients_is_an_empty_success() {
        let report = block_on(notify(&MockEmailSender::default(), &will(), "Jane", &[]));
        assert_eq!((report.sent, report.total), (0, 0));
        assert!(report.partial_failure().is_none());
    }

    #[test]
    fn email_names_owner_and_title() {
        let email = compose_email(&will(), "Jane Doe", &recipient(4, None), "d@example.com");
        assert_eq!(email.to, "d@example.com");
        assert!(email.subject.contains("Jane Doe"));
        assert!(email.body.contains("\"My wishes\""));
        assert_eq!(email.idempotency_key, "will-7-round-1-recipient-4");

        let anonymous = compose_email(&will(), "   ", &recipient(4, None), "d@example.com");
        assert!(anonymous.subject.starts_with("Someone"));
    }
}
