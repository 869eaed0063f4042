// Three route tiers, mirrored in the router:
// public (no session) -> pages (session resolved, gate-driven redirects)
// -> protected JSON API (/api/*, JWT middleware)
pub mod pages;
pub mod protected;
pub mod public;
