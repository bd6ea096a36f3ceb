//! Client-side half of the access guard: a session cache with an explicit
//! unknown/loading/resolved lifecycle and the route-guard decision logic the
//! browser app applies before rendering a protected page.

pub mod guard;
pub mod session;

pub use guard::{decide, logout, RouteDecision};
pub use session::{Session, SessionCache, SessionState};
