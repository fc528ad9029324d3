//! Parameterized SQL, one repository per entity.
//!
//! Every function takes `&mut PgConnection` so callers decide the scope:
//! pass `&mut *tx` inside a transaction or `&mut *conn` from a pooled
//! connection for plain reads.

pub mod pdd;
pub mod user;
pub mod video;

pub use pdd::{PddFields, PddRepository};
pub use user::{NewUser, UserRepository, UserUpdate};
pub use video::VideoRepository;
