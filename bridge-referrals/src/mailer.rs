//! Mail transport seam.

use async_trait::async_trait;
use bridge_core::Email;
use serde_json::Value;

use crate::TransportError;

/// Lower-level mail transport.
///
/// One call is one delivery attempt; implementations must not retry.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Render `template` with `context` and deliver it to `recipient`.
    ///
    /// # Errors
    /// Returns [`TransportError`] if the message is not accepted for delivery.
    async fn dispatch(
        &self,
        template: &str,
        recipient: &Email,
        context: &Value,
    ) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for Box<T> {
    async fn dispatch(
        &self,
        template: &str,
        recipient: &Email,
        context: &Value,
    ) -> Result<(), TransportError> {
        (**self).dispatch(template, recipient, context).await
    }
}

/// Transport that only records deliveries in the trace log.
///
/// Used when no mail relay is configured.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn dispatch(
        &self,
        template: &str,
        recipient: &Email,
        context: &Value,
    ) -> Result<(), TransportError> {
        tracing::info!(%template, %recipient, %context, "mail dispatched to log transport");
        Ok(())
    }
}
