//! Gmail implementation of the outbound mail seam.
//!
//! Messages are assembled as RFC 822 text (multipart when a resume is
//! attached) and handed to the Gmail API's send upload endpoint.

use crate::workflows::recruit::gateways::GatewaySetupError;
use crate::workflows::recruit::notify::{MailError, MailGateway, OutboundMessage};
use base64::{engine::general_purpose, Engine as _};
use google_gmail1::{api::Message, Gmail};
use std::io::Cursor;
use tokio::runtime::Runtime;

const MIXED_BOUNDARY: &str = "=_recruit_ai_mixed_7f3a9d2c";
const BASE64_LINE_WIDTH: usize = 76;

pub struct GmailClient<C>
where
    C: google_gmail1::common::Connector + Send + Sync + 'static,
{
    hub: Gmail<C>,
    sender: String,
    runtime: Runtime,
}

impl<C> GmailClient<C>
where
    C: google_gmail1::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: Gmail<C>, sender: impl Into<String>, runtime: Runtime) -> Self {
        Self {
            hub,
            sender: sender.into(),
            runtime,
        }
    }

    pub fn with_runtime(
        hub: Gmail<C>,
        sender: impl Into<String>,
    ) -> Result<Self, GatewaySetupError> {
        let runtime = Runtime::new().map_err(|err| GatewaySetupError::Runtime(err.to_string()))?;
        Ok(Self::new(hub, sender, runtime))
    }
}

impl<C> std::fmt::Debug for GmailClient<C>
where
    C: google_gmail1::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailClient")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl<C> MailGateway for GmailClient<C>
where
    C: google_gmail1::common::Connector + Send + Sync + 'static,
{
    fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let raw = rfc822_message(&self.sender, message);
        let result = self.runtime.block_on(async {
            self.hub
                .users()
                .messages_send(Message::default(), "me")
                .upload(
                    Cursor::new(raw.into_bytes()),
                    "message/rfc822".parse().expect("valid mime type"),
                )
                .await
        });

        result
            .map(|_| ())
            .map_err(|err| MailError::Transport(err.to_string()))
    }
}

/// Assemble the RFC 822 representation the Gmail send endpoint expects.
fn rfc822_message(sender: &str, message: &OutboundMessage) -> String {
    let mut raw = String::new();
    raw.push_str(&format!("From: {sender}\r\n"));
    raw.push_str(&format!("To: {}\r\n", message.to));
    raw.push_str(&format!("Subject: {}\r\n", message.subject));
    raw.push_str("MIME-Version: 1.0\r\n");

    match &message.attachment {
        None => {
            raw.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n\r\n");
            raw.push_str(&message.body);
        }
        Some(attachment) => {
            raw.push_str(&format!(
                "Content-Type: multipart/mixed; boundary=\"{MIXED_BOUNDARY}\"\r\n\r\n"
            ));
            raw.push_str(&format!("--{MIXED_BOUNDARY}\r\n"));
            raw.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n\r\n");
            raw.push_str(&message.body);
            raw.push_str("\r\n");

            raw.push_str(&format!("--{MIXED_BOUNDARY}\r\n"));
            raw.push_str("Content-Type: application/pdf\r\n");
            raw.push_str("Content-Transfer-Encoding: base64\r\n");
            raw.push_str(&format!(
                "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
                attachment.filename
            ));
            raw.push_str(&wrapped_base64(&attachment.bytes));
            raw.push_str(&format!("--{MIXED_BOUNDARY}--\r\n"));
        }
    }
    raw
}

fn wrapped_base64(bytes: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(bytes);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_WIDTH + 2);
    let mut remaining = encoded.as_str();
    while !remaining.is_empty() {
        let take = remaining.len().min(BASE64_LINE_WIDTH);
        wrapped.push_str(&remaining[..take]);
        wrapped.push_str("\r\n");
        remaining = &remaining[take..];
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::recruit::notify::Attachment;

    fn message(attachment: Option<Attachment>) -> OutboundMessage {
        OutboundMessage {
            to: "dana.reed@acme.com".to_string(),
            subject: "Potential Candidate Match for backend.txt".to_string(),
            body: "Hi Dana,\n\nDetails inside.".to_string(),
            attachment,
        }
    }

    #[test]
    fn plain_message_has_text_content_type() {
        let raw = rfc822_message("agent@example.com", &message(None));
        assert!(raw.starts_with("From: agent@example.com\r\n"));
        assert!(raw.contains("To: dana.reed@acme.com\r\n"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(!raw.contains("multipart/mixed"));
        assert!(raw.ends_with("Details inside."));
    }

    #[test]
    fn attachment_produces_multipart_with_base64_part() {
        let raw = rfc822_message(
            "agent@example.com",
            &message(Some(Attachment {
                filename: "resume.pdf".to_string(),
                bytes: vec![0u8; 100],
            })),
        );
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("Content-Disposition: attachment; filename=\"resume.pdf\""));
        assert!(raw.contains("Content-Transfer-Encoding: base64"));
        assert!(raw.trim_end().ends_with(&format!("--{MIXED_BOUNDARY}--")));
    }

    #[test]
    fn base64_lines_stay_within_mime_width() {
        let wrapped = wrapped_base64(&vec![7u8; 300]);
        assert!(wrapped.lines().all(|line| line.len() <= BASE64_LINE_WIDTH));
        let rejoined: String = wrapped.lines().collect();
        assert_eq!(
            general_purpose::STANDARD.decode(rejoined).expect("decodes"),
            vec![7u8; 300]
        );
    }
}
