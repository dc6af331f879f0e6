mod relationship_service;
mod token_verifier;
mod user_service;

pub use relationship_service::*;
pub use token_verifier::*;
pub use user_service::*;
