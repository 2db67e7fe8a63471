mod account;
mod session;
mod verification;
