use std::time::Duration;

use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::Tls;
use lettre::{Message, SmtpTransport, Transport};
use serde_json::Value;

use crate::{
    config::{SMTPSettings, Template},
    Error, Success,
};

use super::definition::AbstractMailer;

/// Notification sink delivering over SMTP
#[derive(Clone)]
pub struct SmtpMailer {
    settings: SMTPSettings,
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Build the transport up front
    ///
    /// Every SMTP exchange is bounded by the configured socket timeout,
    /// so dispatching a notification can never stall a caller
    /// indefinitely.
    pub fn new(settings: SMTPSettings) -> SmtpMailer {
        let relay = SmtpTransport::relay(&settings.host).expect("valid `smtp_host`");

        let relay = if let Some(port) = settings.port {
            relay.port(port.try_into().expect("valid `smtp_port`"))
        } else {
            relay
        };

        let relay = if let Some(false) = settings.use_tls {
            relay.tls(Tls::None)
        } else {
            relay
        };

        let transport = relay
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(settings.timeout.unwrap_or(10))))
            .build();

        SmtpMailer {
            settings,
            transport,
        }
    }
}

#[async_trait]
impl AbstractMailer for SmtpMailer {
    /// Render a template and deliver it to `to`
    async fn send(&self, to: &str, template: &Template, variables: Value) -> Success {
        let message = Message::builder()
            .from(self
                .settings
                .from
                .parse()
                .map_err(|_| Error::IncorrectData { with: "from" })?)
            .to(to.parse().map_err(|_| Error::IncorrectData { with: "email" })?);

        let message = if let Some(reply_to) = &self.settings.reply_to {
            message.reply_to(
                reply_to
                    .parse()
                    .map_err(|_| Error::IncorrectData { with: "reply_to" })?,
            )
        } else {
            message
        };

        let message = message.subject(template.title.clone());

        let text = super::render_template(&template.text, &variables)?;
        let message = if let Some(html) = &template.html {
            message.multipart(lettre::message::MultiPart::alternative_plain_html(
                text,
                super::render_template(html, &variables)?,
            ))
        } else {
            message.body(text)
        }
        .map_err(|_| Error::InternalError)?;

        if let Err(error) = self.transport.send(&message) {
            error!("Failed to send email to {}!\nlettre error: {}", to, error);
            return Err(Error::NotificationUnavailable);
        }

        Ok(())
    }
}
