pub mod delete_account;
pub mod health;

pub use delete_account::{delete_account, SUCCESS_MESSAGE};
pub use health::health;
