#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Error {
    IncorrectData {
        with: &'static str,
    },
    DatabaseError {
        operation: &'static str,
        with: &'static str,
    },
    InternalError,
    OperationFailed,
    RenderFail,

    DuplicateAccount,
    AccountNotFound,
    InvalidCredentials,
    UnverifiedAccount,
    DisabledAccount,

    SessionExpired,
    SessionRevoked,
    SessionNotFound,

    TokenExpired,
    TokenAlreadyUsed,
    TokenNotFound,

    NotificationUnavailable,

    ShortPassword,
    CompromisedPassword,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
pub type Success = Result<()>;
