use serde_json::Value;

use crate::{config::Template, Success};

/// Notification sink
///
/// The only out-of-band channel the core talks to. Implementations
/// must return within a bounded time; callers treat a failure as a
/// degraded result, never as a reason to roll back.
#[async_trait]
pub trait AbstractMailer: std::marker::Sync {
    /// Render a template and deliver it to `to`
    async fn send(&self, to: &str, template: &Template, variables: Value) -> Success;
}
