// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler here reads the caller from the `AuthUser` extension set by
// `jwt_auth_middleware` and scopes all reads and writes to that user.
pub mod pdds;
pub mod user;
pub mod videos;
