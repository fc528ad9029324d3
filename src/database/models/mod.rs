pub mod pdd;
pub mod user;
pub mod video;

pub use pdd::Pdd;
pub use user::User;
pub use video::VideoObj;
