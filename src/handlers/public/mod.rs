// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation and token acquisition. These handlers receive no user
// context and validate every input themselves.
pub mod user;

pub use user::{create_token, create_user};
