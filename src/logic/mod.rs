mod credentials;
mod sessions;
mod verification;

pub use credentials::*;
pub use sessions::*;
pub use verification::*;
