/// Data models for the account directory
pub mod account;

pub use account::{AccountEdit, AccountPatch, AccountProfile, NewAccount, UserAccount};
