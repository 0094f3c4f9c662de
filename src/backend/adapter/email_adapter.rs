// src/backend/adapter/email_adapter.rs
use crate::error::WillError;
use crate::services::notification_service::{EmailSender, OutgoingEmail};
use crate::storage::config::{self, EmailConfig};
use crate::utils::logging;
use candid::Nat;
use ic_cdk::api::management_canister::http_request::{
    http_request, CanisterHttpRequestArgument, HttpHeader, HttpMethod, HttpResponse, TransformArgs,
    TransformContext,
};
use serde::Serialize;

const MAX_RESPONSE_BYTES: u64 = 1024 * 2; // Relay replies with a short JSON ack
pub const TRANSFORM_FN: &str = "transform_email_response";

/// JSON body accepted by the email relay.
#[derive(Serialize, Debug)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends notification emails through an HTTP relay using canister outcalls.
pub struct HttpEmailSender {
    config: EmailConfig,
}

impl HttpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Sender built from the persisted configuration.
    pub fn from_config() -> Self {
        Self::new(config::get_email_config())
    }

    /// JSON body posted to the relay. Fails when no relay is configured.
    fn relay_body(&self, email: &OutgoingEmail) -> Result<Vec<u8>, WillError> {
        if self.config.relay_url.is_empty() {
            return Err(WillError::NotificationFailed(
                "Email relay URL is not configured".to_string(),
            ));
        }
        serde_json::to_vec(&RelayRequest {
            from: &self.config.sender_address,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
        })
        .map_err(|e| WillError::NotificationFailed(format!("Failed to encode email: {}", e)))
    }

    fn relay_headers(email: &OutgoingEmail) -> Vec<HttpHeader> {
        vec![
            HttpHeader {
                name: "Content-Type".to_string(),
                value: "application/json".to_string(),
            },
            // Every replica performs the outcall; the relay deduplicates on this key.
            HttpHeader {
                name: "Idempotency-Key".to_string(),
                value: email.idempotency_key.clone(),
            },
        ]
    }
}

impl EmailSender for HttpEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), WillError> {
        let request = CanisterHttpRequestArgument {
            url: self.config.relay_url.clone(),
            method: HttpMethod::POST,
            body: Some(self.relay_body(email)?),
            max_response_bytes: Some(MAX_RESPONSE_BYTES),
            // Needs the canister id; only available inside a canister
            transform: Some(TransformContext::from_name(TRANSFORM_FN.to_string(), vec![])),
            headers: Self::relay_headers(email),
        };
        match http_request(request, self.config.outcall_cycles).await {
            Ok((response,)) => {
                if response.status >= Nat::from(200u32) && response.status < Nat::from(300u32) {
                    Ok(())
                } else {
                    Err(WillError::NotificationFailed(format!(
                        "Relay returned status {} for {}: {}",
                        response.status,
                        email.to,
                        String::from_utf8_lossy(&response.body)
                    )))
                }
            }
            Err((code, msg)) => {
                logging::error(format!("Email outcall failed: {:?} - {}", code, msg));
                Err(WillError::NotificationFailed(format!(
                    "Outcall to relay failed: {:?} - {}",
                    code, msg
                )))
            }
        }
    }
}

/// Drops response headers so all replicas agree on the outcall result.
pub fn transform_response(args: TransformArgs) -> HttpResponse {
    HttpResponse {
        status: args.response.status,
        body: args.response.body,
        headers: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "ana@example.com".to_string(),
            subject: "Hello".to_string(),
            body: "Body".to_string(),
            idempotency_key: "will-1-round-1-recipient-2".to_string(),
        }
    }

    #[test]
    fn body_is_json_from_configured_sender() {
        let sender = HttpEmailSender::new(EmailConfig {
            relay_url: "https://relay.example.org/send".to_string(),
            sender_address: "wishes@example.org".to_string(),
            outcall_cycles: 1,
        });
        let body: serde_json::Value = serde_json::from_slice(&sender.relay_body(&email()).unwrap()).unwrap();
        assert_eq!(body["from"], "wishes@example.org");
        assert_eq!(body["to"], "ana@example.com");
        assert_eq!(body["subject"], "Hello");
    }

    #[test]
    fn headers_carry_the_idempotency_key() {
        let headers = HttpEmailSender::relay_headers(&email());
        assert!(headers
            .iter()
            .any(|h| h.name == "Idempotency-Key" && h.value == "will-1-round-1-recipient-2"));
        assert!(headers.iter().any(|h| h.name == "Content-Type"));
    }

    #[test]
    fn unconfigured_relay_fails_without_outcall() {
        let sender = HttpEmailSender::new(EmailConfig::default());
        assert!(matches!(
            sender.relay_body(&email()),
            Err(WillError::NotificationFailed(_))
        ));
    }

    #[test]
    fn transform_strips_headers() {
        let response = HttpResponse {
            status: Nat::from(202u32),
            headers: vec![HttpHeader {
                name: "Date".to_string(),
                value: "now".to_string(),
            }],
            body: b"{}".to_vec(),
        };
        let out = transform_response(TransformArgs {
            response,
            context: vec![],
        });
        assert!(out.headers.is_empty());
        assert_eq!(out.status, Nat::from(202u32));
    }
}
