//! Screen components.

pub mod user_form;
pub mod users;

pub use users::UsersScreen;
