use std::ops::Deref;

use serde_json::Value;

use crate::{Error, Result};

use self::definition::AbstractMailer;

pub mod definition;

mod dummy;
pub use dummy::{DummyMailer, OutgoingMail};

mod smtp;
pub use smtp::SmtpMailer;

lazy_static! {
    static ref HANDLEBARS: handlebars::Handlebars<'static> = handlebars::Handlebars::new();
}

/// Render a handlebars template
pub(crate) fn render_template(text: &str, variables: &Value) -> Result<String> {
    HANDLEBARS
        .render_template(text, variables)
        .map_err(|_| Error::RenderFail)
}

#[derive(Clone)]
pub enum Mailer {
    Dummy(DummyMailer),
    Smtp(SmtpMailer),
}

impl Default for Mailer {
    fn default() -> Self {
        Self::Dummy(DummyMailer::default())
    }
}

impl Deref for Mailer {
    type Target = dyn AbstractMailer;

    fn deref(&self) -> &Self::Target {
        match self {
            Mailer::Dummy(dummy) => dummy,
            Mailer::Smtp(smtp) => smtp,
        }
    }
}
