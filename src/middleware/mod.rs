pub mod auth;
pub mod response;

pub use auth::{identify_caller, Caller};
pub use response::{handle_error, Responder, ResponseEnvelope};
