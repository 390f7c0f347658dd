use crate::domain::model::{Alert, AlertDelivery};
use crate::domain::ports::{CommandRunner, CommandSpec};
use std::time::Duration;

/// Mail programs in order of preference.
const MAIL: &str = "mail";
const SENDMAIL: &str = "sendmail";

/// Sends alerts by local mail. Delivery problems are logged, never raised.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    recipient: Option<String>,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(recipient: Option<String>, timeout: Duration) -> Self {
        Self { recipient, timeout }
    }

    pub async fn dispatch<R: CommandRunner + ?Sized>(
        &self,
        runner: &R,
        alert: &Alert,
    ) -> AlertDelivery {
        tracing::warn!(alert = %alert.subject, "ALERT: {}", alert.body);

        let Some(recipient) = self.recipient.as_deref() else {
            tracing::debug!("No alert recipient configured, alert not mailed");
            return AlertDelivery::Dropped("no recipient configured".to_string());
        };

        let spec = if runner.is_available(MAIL) {
            CommandSpec::new(MAIL, self.timeout)
                .arg("-s")
                .arg(alert.subject.as_str())
                .arg(recipient)
                .stdin(alert.body.as_bytes())
        } else if runner.is_available(SENDMAIL) {
            let message = format!(
                "To: {}\nSubject: {}\n\n{}\n",
                recipient, alert.subject, alert.body
            );
            CommandSpec::new(SENDMAIL, self.timeout)
                .arg("-t")
                .stdin(message.into_bytes())
        } else {
            tracing::warn!("Neither mail nor sendmail is available, alert dropped");
            return AlertDelivery::Dropped("no mail program available".to_string());
        };

        match runner.run(&spec).await {
            Ok(output) if output.success => {
                tracing::info!(recipient, "Alert sent with {}", spec.program);
                AlertDelivery::Sent(spec.program)
            }
            Ok(output) => {
                let reason = format!("{} failed: {}", spec.program, output.stderr_text());
                tracing::warn!("Alert delivery failed: {}", reason);
                AlertDelivery::Dropped(reason)
            }
            Err(e) => {
                tracing::warn!("Alert delivery failed: {}", e);
                AlertDelivery::Dropped(e.to_string())
            }
        }
    }
}
