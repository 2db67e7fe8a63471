use serde_json::Value;

use crate::{config::Template, Error, Success};

use futures::lock::Mutex;
use std::sync::Arc;

use super::definition::AbstractMailer;

/// Mail captured by the dummy sink
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub title: String,
    pub text: String,
}

/// In-memory notification sink
///
/// Renders into an outbox instead of delivering. Set `unavailable`
/// to exercise degraded delivery paths.
#[derive(Default, Clone)]
pub struct DummyMailer {
    pub outbox: Arc<Mutex<Vec<OutgoingMail>>>,
    pub unavailable: bool,
}

#[async_trait]
impl AbstractMailer for DummyMailer {
    /// Render a template and deliver it to `to`
    async fn send(&self, to: &str, template: &Template, variables: Value) -> Success {
        if self.unavailable {
            return Err(Error::NotificationUnavailable);
        }

        let text = super::render_template(&template.text, &variables)?;

        let mut outbox = self.outbox.lock().await;
        outbox.push(OutgoingMail {
            to: to.to_string(),
            title: template.title.clone(),
            text,
        });

        Ok(())
    }
}
