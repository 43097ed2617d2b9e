//! Multipart email formatting.
//!
//! [`format_mail`] renders the embedded tera templates into a [`MailDocument`]
//! holding both body parts, the header recipients and the envelope
//! recipients. BCC addresses only ever reach the envelope.

use std::collections::HashSet;
use std::sync::LazyLock;

use jiff::Timestamp;
use lettre::address::Envelope;
use lettre::message::{Mailbox, MultiPart};
use lettre::{Address, Message};
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};
use crate::models::EmailNotificationRequest;

/// Display name and address mail is sent from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub name: String,
    pub email: String,
}

impl From<&SmtpConfig> for SenderIdentity {
    fn from(config: &SmtpConfig) -> Self {
        Self {
            name: config.sender_name.clone(),
            email: config.sender_email.clone(),
        }
    }
}

/// A formatted email, ready to be rendered to wire form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDocument {
    pub sender: SenderIdentity,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    /// to, cc and bcc merged, case-insensitively deduplicated
    pub envelope_recipients: Vec<String>,
    pub bcc_count: usize,
}

impl MailDocument {
    /// Value of the `From` header
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.sender.name, self.sender.email)
    }

    /// Build the MIME message and the SMTP envelope.
    ///
    /// The message carries `To` and `Cc` headers only; delivery uses the
    /// explicit envelope.
    pub fn to_message(&self) -> AppResult<(Message, Envelope)> {
        let from_address: Address =
            self.sender
                .email
                .trim()
                .parse()
                .map_err(|e| AppError::Configuration {
                    key: "smtp.sender_email".to_string(),
                    source: anyhow::Error::new(e),
                })?;
        let sender_name = Some(self.sender.name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let mut builder = Message::builder()
            .from(Mailbox::new(sender_name, from_address.clone()))
            .subject(self.subject.clone());
        for to in &self.to {
            builder = builder.to(Mailbox::new(None, parse_address("to_emails", to)?));
        }
        for cc in &self.cc {
            builder = builder.cc(Mailbox::new(None, parse_address("cc_emails", cc)?));
        }

        let message = builder
            .multipart(MultiPart::alternative_plain_html(
                self.text_body.clone(),
                self.html_body.clone(),
            ))
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::new(e).context("Failed to build email message"),
            })?;

        let recipients = self
            .envelope_recipients
            .iter()
            .map(|address| parse_address("recipients", address))
            .collect::<AppResult<Vec<_>>>()?;
        let envelope =
            Envelope::new(Some(from_address), recipients).map_err(|e| AppError::Validation {
                field: "recipients".to_string(),
                reason: e.to_string(),
            })?;

        Ok((message, envelope))
    }
}

fn parse_address(field: &str, raw: &str) -> AppResult<Address> {
    raw.trim().parse().map_err(|e| AppError::Validation {
        field: field.to_string(),
        reason: format!("Invalid email address '{}': {}", raw, e),
    })
}

const HTML_TEMPLATE: &str = "notification_email.html";
const TEXT_TEMPLATE: &str = "notification_email.txt";

/// Embedded mail templates; `.html` templates are autoescaped.
static TEMPLATES: LazyLock<Result<Tera, String>> = LazyLock::new(|| {
    let mut engine = Tera::default();
    let loaded = engine.add_raw_templates(vec![
        (
            HTML_TEMPLATE,
            include_str!("../../../templates/notification_email.html"),
        ),
        (
            TEXT_TEMPLATE,
            include_str!("../../../templates/notification_email.txt"),
        ),
    ]);
    match loaded {
        Ok(()) => Ok(engine),
        Err(e) => Err(e.to_string()),
    }
});

#[derive(Serialize)]
struct InfoRow<'a> {
    key: &'a str,
    value: &'a str,
}

/// Format `request` for delivery from `sender`, stamped with the current time.
///
/// # Errors
/// Returns `AppError::Internal` if a mail template fails to render.
pub fn format_mail(
    request: &EmailNotificationRequest,
    sender: &SenderIdentity,
) -> AppResult<MailDocument> {
    format_mail_at(request, sender, Timestamp::now())
}

pub fn format_mail_at(
    request: &EmailNotificationRequest,
    sender: &SenderIdentity,
    sent_at: Timestamp,
) -> AppResult<MailDocument> {
    let context = template_context(request, sent_at);
    let text_body = render(TEXT_TEMPLATE, &context)?;
    let html_body = match request
        .html_message
        .as_deref()
        .filter(|html| !html.trim().is_empty())
    {
        Some(html) => html.to_string(),
        None => render(HTML_TEMPLATE, &context)?,
    };
    let (envelope_recipients, bcc_count) = envelope_recipients(request);

    Ok(MailDocument {
        sender: sender.clone(),
        to: request.to_emails.clone(),
        cc: request.cc().to_vec(),
        subject: request.subject.clone(),
        text_body,
        html_body,
        envelope_recipients,
        bcc_count,
    })
}

/// Merge to, cc and bcc into one deduplicated list.
///
/// The count is the number of BCC addresses that survived deduplication.
fn envelope_recipients(request: &EmailNotificationRequest) -> (Vec<String>, usize) {
    let mut seen = HashSet::new();
    let mut keep = |address: &String| {
        let address = address.trim();
        seen.insert(address.to_lowercase()).then(|| address.to_string())
    };

    let mut recipients: Vec<String> = request
        .to_emails
        .iter()
        .chain(request.cc())
        .filter_map(&mut keep)
        .collect();
    let visible = recipients.len();
    recipients.extend(request.bcc().iter().filter_map(&mut keep));
    let bcc_count = recipients.len() - visible;

    (recipients, bcc_count)
}

fn template_context(request: &EmailNotificationRequest, sent_at: Timestamp) -> Context {
    let url = request.url.as_deref().filter(|url| !url.is_empty());
    let info: Vec<InfoRow<'_>> = request
        .additional_info
        .iter()
        .flatten()
        .map(|(key, value)| InfoRow { key, value })
        .collect();

    let mut context = Context::new();
    context.insert("subject", &request.subject);
    context.insert("message", &request.message);
    context.insert("url", &url);
    context.insert("info", &info);
    context.insert("sent_at", &sent_at.strftime("%Y-%m-%d %H:%M:%S").to_string());
    context
}

fn render(template: &str, context: &Context) -> AppResult<String> {
    let engine = TEMPLATES.as_ref().map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to load mail templates: {}", e),
    })?;
    engine.render(template, context).map_err(|e| AppError::Internal {
        source: anyhow::Error::new(e).context(format!("Failed to render {}", template)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use proptest::prelude::*;

    fn sender() -> SenderIdentity {
        SenderIdentity {
            name: "Notification Service".to_string(),
            email: "alerts@example.com".to_string(),
        }
    }

    fn request(to: &[&str]) -> EmailNotificationRequest {
        EmailNotificationRequest {
            to_emails: to.iter().map(|s| s.to_string()).collect(),
            subject: "S".to_string(),
            message: "M".to_string(),
            cc_emails: None,
            bcc_emails: None,
            html_message: None,
            url: None,
            additional_info: None,
        }
    }

    fn rendered_headers(mail: &MailDocument) -> String {
        let (message, _) = mail.to_message().unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        raw.split("\r\n\r\n").next().unwrap().to_string()
    }

    #[test]
    fn test_minimal_mail() {
        let mail = format_mail(&request(&["a@x.com"]), &sender()).unwrap();

        assert_eq!(mail.to, vec!["a@x.com"]);
        assert_eq!(mail.subject, "S");
        assert_eq!(mail.text_body, "M");
        assert!(mail.html_body.contains("<p>M</p>"));
        assert!(mail.html_body.contains("This is an automated notification"));
        assert_eq!(mail.from_header(), "Notification Service <alerts@example.com>");

        let headers = rendered_headers(&mail);
        assert!(headers.contains("To: a@x.com"));
        assert!(headers.contains("Subject: S"));
        assert!(!headers.contains("Cc:"));
    }

    #[test]
    fn test_text_body_with_url_and_info() {
        let mut req = request(&["a@x.com"]);
        req.url = Some("https://example.com/x".to_string());
        let mut info = IndexMap::new();
        info.insert("Host".to_string(), "db-01".to_string());
        info.insert("Usage".to_string(), "93%".to_string());
        req.additional_info = Some(info);

        let mail = format_mail(&req, &sender()).unwrap();
        assert_eq!(
            mail.text_body,
            "M\n\nURL: https://example.com/x\n\nAdditional Information:\n  Host: db-01\n  Usage: 93%"
        );

        let host = mail.html_body.find("<td>Host</td>").unwrap();
        let usage = mail.html_body.find("<td>Usage</td>").unwrap();
        assert!(host < usage);
        assert!(mail.html_body.contains("href=\"https://example.com/x\""));
    }

    #[test]
    fn test_html_message_used_verbatim() {
        let mut req = request(&["a@x.com"]);
        req.html_message = Some("<b>custom</b>".to_string());
        let mail = format_mail(&req, &sender()).unwrap();
        assert_eq!(mail.html_body, "<b>custom</b>");
    }

    #[test]
    fn test_blank_html_message_falls_back_to_generated_body() {
        for html in ["", "  \n"] {
            let mut req = request(&["a@x.com"]);
            req.html_message = Some(html.to_string());
            let mail = format_mail(&req, &sender()).unwrap();
            assert!(mail.html_body.contains("<p>M</p>"));
            assert!(mail.html_body.contains("This is an automated notification"));
        }
    }

    #[test]
    fn test_bcc_count_skips_visible_duplicates() {
        let mut req = request(&["a@x.com"]);
        req.cc_emails = Some(vec!["c@x.com".to_string()]);
        req.bcc_emails = Some(vec![
            "C@x.com".to_string(),
            "h@y.org".to_string(),
            "H@y.org".to_string(),
        ]);

        let mail = format_mail(&req, &sender()).unwrap();
        assert_eq!(mail.envelope_recipients, vec!["a@x.com", "c@x.com", "h@y.org"]);
        assert_eq!(mail.bcc_count, 1);
    }

    #[test]
    fn test_generated_html_escapes_user_values() {
        let mut req = request(&["a@x.com"]);
        req.subject = "<script>".to_string();
        req.message = "a & b\nline two".to_string();
        let mail = format_mail(&req, &sender()).unwrap();

        assert!(mail.html_body.contains("<h2>&lt;script&gt;</h2>"));
        assert!(mail.html_body.contains("a &amp; b<br>line two"));
        assert!(!mail.html_body.contains("<script>"));
        assert!(!mail.html_body.contains("View Details"));
        assert!(!mail.html_body.contains("info-table\">"));
    }

    #[test]
    fn test_footer_timestamp() {
        let sent_at: Timestamp = "2024-05-01T08:30:05Z".parse().unwrap();
        let mail = format_mail_at(&request(&["a@x.com"]), &sender(), sent_at).unwrap();
        assert!(mail.html_body.contains("Sent at 2024-05-01 08:30:05 UTC"));
    }

    #[test]
    fn test_envelope_deduplicates_case_insensitively() {
        let mut req = request(&["a@x.com", "B@x.com"]);
        req.cc_emails = Some(vec!["b@X.com".to_string(), "c@x.com".to_string()]);
        req.bcc_emails = Some(vec!["A@x.com".to_string(), "d@x.com".to_string()]);

        let mail = format_mail(&req, &sender()).unwrap();
        assert_eq!(
            mail.envelope_recipients,
            vec!["a@x.com", "B@x.com", "c@x.com", "d@x.com"]
        );
        assert_eq!(mail.bcc_count, 1);

        let (_, envelope) = mail.to_message().unwrap();
        assert_eq!(envelope.to().len(), 4);
        assert_eq!(envelope.from().unwrap().to_string(), "alerts@example.com");
    }

    #[test]
    fn test_cc_header_rendered() {
        let mut req = request(&["a@x.com"]);
        req.cc_emails = Some(vec!["c@x.com".to_string()]);
        let headers = rendered_headers(&format_mail(&req, &sender()).unwrap());
        assert!(headers.contains("Cc: c@x.com"));
    }

    #[test]
    fn test_invalid_recipient_is_validation_error() {
        let mail = format_mail(&request(&["not an address"]), &sender()).unwrap();
        assert!(matches!(
            mail.to_message(),
            Err(AppError::Validation { field, .. }) if field == "to_emails"
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_bcc_never_in_headers_but_always_in_envelope(
            to in prop::collection::vec("[a-m]{3,8}@to\\.example\\.com", 1..4),
            cc in prop::collection::vec("[a-m]{3,8}@cc\\.example\\.com", 0..3),
            bcc in prop::collection::vec("[n-z]{3,8}@hidden\\.example\\.org", 1..4),
        ) {
            let req = EmailNotificationRequest {
                to_emails: to,
                subject: "Report".to_string(),
                message: "body".to_string(),
                cc_emails: Some(cc),
                bcc_emails: Some(bcc.clone()),
                html_message: None,
                url: None,
                additional_info: None,
            };
            let mail = format_mail(&req, &sender()).unwrap();
            let (message, envelope) = mail.to_message().unwrap();
            let raw = String::from_utf8(message.formatted()).unwrap();

            prop_assert!(!raw.to_lowercase().contains("bcc:"));
            prop_assert!(!raw.contains("hidden.example.org"));

            let envelope_to: Vec<String> = envelope.to().iter().map(|a| a.to_string()).collect();
            for address in &bcc {
                prop_assert!(envelope_to.contains(address));
            }
            let unique: HashSet<String> = envelope_to.iter().map(|a| a.to_lowercase()).collect();
            prop_assert_eq!(unique.len(), envelope_to.len());
        }
    }
}
