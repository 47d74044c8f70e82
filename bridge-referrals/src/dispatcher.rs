//! Referral invite emails.

use async_trait::async_trait;
use bridge_core::{Email, MarketingProfile};
use serde_json::json;

use crate::mailer::MailTransport;
use crate::ReferralError;

/// Sends one referral invite email.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Send the invite from `sender` to `recipient`. Single attempt.
    ///
    /// # Errors
    /// Returns [`ReferralError::Dispatch`] wrapping the transport failure.
    async fn send_email(
        &self,
        sender: &Email,
        recipient: &Email,
        marketing: &MarketingProfile,
    ) -> Result<(), ReferralError>;
}

/// Dispatcher rendering the referral template through a [`MailTransport`].
pub struct MailerDispatcher<T> {
    transport: T,
    template: String,
    url_base: String,
}

impl<T: MailTransport> MailerDispatcher<T> {
    /// # Arguments
    /// - `transport`: delivery backend
    /// - `template`: mailer template name
    /// - `url_base`: prefix joined with the sender's referral link
    #[must_use]
    pub fn new(transport: T, template: impl Into<String>, url_base: impl Into<String>) -> Self {
        Self {
            transport,
            template: template.into(),
            url_base: url_base.into(),
        }
    }

    fn invite_url(&self, marketing: &MarketingProfile) -> Option<String> {
        marketing
            .referral_link
            .as_ref()
            .map(|link| format!("{}{link}", self.url_base))
    }
}

#[async_trait]
impl<T: MailTransport> EmailDispatcher for MailerDispatcher<T> {
    async fn send_email(
        &self,
        sender: &Email,
        recipient: &Email,
        marketing: &MarketingProfile,
    ) -> Result<(), ReferralError> {
        let context = json!({
            "senderEmail": sender.as_str(),
            "url": self.invite_url(marketing),
        });
        self.transport
            .dispatch(&self.template, recipient, &context)
            .await
            .map_err(|e| {
                tracing::warn!(%sender, %recipient, error = %e, "referral email failed");
                ReferralError::from(e)
            })
    }
}
