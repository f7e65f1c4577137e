//! Record models.

pub mod account;
pub mod game_mod;

pub use account::Account;
pub use game_mod::{Comment, Mod};
