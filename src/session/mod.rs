pub mod manager;
pub mod router;

pub use manager::{SessionManager, SessionState};
pub use router::{Destination, LoginOutcome, RegistrationOutcome, SessionRouter};
