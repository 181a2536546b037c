//! Borrow-decision notifications: a database-backed mail queue flushed
//! over SMTP.

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::{
        borrow_request::BorrowRequest,
        enums::{NotificationKind, RequestStatus},
        notification::{MailNotification, NotificationQuery},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
    config: EmailConfig,
}

impl NotificationsService {
    pub fn new(repository: Repository, config: EmailConfig) -> Self {
        Self { repository, config }
    }

    /// Queue a mail for a decided borrow request. Requests of users
    /// without an email address are skipped.
    pub async fn notify_decision(
        &self,
        request: &BorrowRequest,
        reason: Option<&str>,
    ) -> AppResult<()> {
        let user = self.repository.users.get_by_id(request.user_id).await?;
        let Some(email) = user.email.as_deref().filter(|e| !e.is_empty()) else {
            tracing::warn!(
                request_id = request.id,
                user_id = user.id,
                "user has no email address, skipping notification"
            );
            return Ok(());
        };

        let (kind, subject, body) = match request.status {
            RequestStatus::Approved => (
                NotificationKind::RequestApproved,
                format!("Your borrow request #{} was approved", request.id),
                format!(
                    r#"
Your borrow request #{id} has been approved.

Pick-up from: {from}
Return by:    {to}

Happy reading!
"#,
                    id = request.id,
                    from = request.requested_from,
                    to = request.requested_to,
                ),
            ),
            RequestStatus::Rejected => (
                NotificationKind::RequestRejected,
                format!("Your borrow request #{} was rejected", request.id),
                format!(
                    r#"
Your borrow request #{id} has been rejected.

Reason: {reason}

You can submit a new request at any time.
"#,
                    id = request.id,
                    reason = reason.unwrap_or(request.rejection_reason.as_str()),
                ),
            ),
            status => {
                return Err(AppError::Internal(format!(
                    "No notification defined for request status {}",
                    status
                )))
            }
        };

        self.repository
            .notifications
            .enqueue(kind, Some(user.id), request.admin_id, email, &subject, &body)
            .await?;

        Ok(())
    }

    /// List queued mails
    pub async fn search(
        &self,
        query: &NotificationQuery,
    ) -> AppResult<(Vec<MailNotification>, i64)> {
        self.repository.notifications.search(query).await
    }

    /// Deliver pending mails; returns the number sent. Failures are
    /// marked and stay visible in the queue.
    pub async fn flush_pending(&self) -> AppResult<u64> {
        let pending = self.repository.notifications.fetch_pending(50).await?;
        let mut sent = 0u64;

        for entry in pending {
            match self.send_email(&entry.to_email, &entry.subject, &entry.body) {
                Ok(()) => {
                    self.repository.notifications.mark_sent(entry.id).await?;
                    sent += 1;
                }
                Err(e) => {
                    tracing::warn!(mail_id = entry.id, "failed to send mail: {}", e);
                    self.repository.notifications.mark_failed(entry.id).await?;
                }
            }
        }

        if sent > 0 {
            tracing::info!(sent, "flushed mail queue");
        }
        Ok(sent)
    }

    /// Generic email sending function
    fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Librarium");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><pre>{}</pre></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) = (
            &self.config.smtp_username,
            &self.config.smtp_password,
        ) {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
