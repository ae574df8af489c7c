pub mod templates;
pub mod transport;

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::models::Submission;

pub use transport::{DisabledMailer, MailTransport, OutgoingMail, SmtpMailer};

/// Renders and delivers the two messages for an accepted submission.
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    site: SiteConfig,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>, site: SiteConfig) -> Self {
        Self { transport, site }
    }

    /// Notice for the site operator. Replies go to the submitter when known.
    pub fn operator_notice(&self, submission: &Submission) -> Result<OutgoingMail, String> {
        let subject = submission.form_type.notice_subject(&self.site.name);
        let html = templates::render_operator_notice(submission, &subject)?;

        Ok(OutgoingMail {
            to: self.site.admin_email.clone(),
            reply_to: Some(
                submission
                    .fields
                    .reply_address()
                    .unwrap_or(&self.site.admin_email)
                    .to_string(),
            ),
            subject,
            html,
        })
    }

    /// Confirmation for the submitter, `None` when no address was given.
    pub fn confirmation(&self, submission: &Submission) -> Result<Option<OutgoingMail>, String> {
        let Some(to) = submission.fields.reply_address() else {
            return Ok(None);
        };

        let html = templates::render_confirmation(submission, &self.site)?;

        Ok(Some(OutgoingMail {
            to: to.to_string(),
            reply_to: Some(self.site.admin_email.clone()),
            subject: format!("Thank you for contacting {}", self.site.name),
            html,
        }))
    }

    /// Send both messages, one attempt each. Failures are logged, never returned.
    pub async fn deliver(&self, submission: &Submission) {
        match self.operator_notice(submission) {
            Ok(mail) => self.send_logged(&mail, submission).await,
            Err(e) => tracing::error!(
                "Operator notice for {} submission {} not sent: {e}",
                submission.form_type,
                submission.id
            ),
        }

        match self.confirmation(submission) {
            Ok(Some(mail)) => self.send_logged(&mail, submission).await,
            Ok(None) => {}
            Err(e) => tracing::error!(
                "Confirmation for {} submission {} not sent: {e}",
                submission.form_type,
                submission.id
            ),
        }
    }

    async fn send_logged(&self, mail: &OutgoingMail, submission: &Submission) {
        match self.transport.send(mail).await {
            Ok(()) => tracing::info!(
                "Sent \"{}\" for {} submission {}",
                mail.subject,
                submission.form_type,
                submission.id
            ),
            Err(e) => tracing::error!(
                "Failed to send email for form type {} (submission {}): {e}",
                submission.form_type,
                submission.id
            ),
        }
    }
}
