use async_std::channel::Sender;

use crate::models::{Account, Session, VerificationPurpose};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event_type")]
pub enum LoginEvent {
    CreateAccount {
        account: Account,
    },
    CreateSession {
        session: Session,
    },
    DeleteSession {
        user_id: String,
        session_id: String,
    },
    RevokeAllSessions {
        user_id: String,
    },
    StartVerification {
        account_id: String,
        purpose: VerificationPurpose,
    },
    ConsumeVerification {
        account_id: String,
        purpose: VerificationPurpose,
    },
}

pub(crate) async fn publish(channel: &Option<Sender<LoginEvent>>, event: LoginEvent) {
    if let Some(sender) = channel {
        if let Err(err) = sender.send(event).await {
            error!("Failed to publish a login event: {:?}", err);
        }
    }
}
