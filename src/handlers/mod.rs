// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (bearer JWT, user scoped).
// One function per route; the router in `app.rs` attaches the auth layer
// to the protected tier only.
pub mod protected; // Tier 2: JWT authentication required
pub mod public;    // Tier 1: No authentication required
