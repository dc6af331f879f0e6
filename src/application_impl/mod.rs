mod relationship_service_impl;
mod token_verifier_fake;
mod token_verifier_jwt;
mod user_service_impl;

pub use relationship_service_impl::*;
pub use token_verifier_fake::*;
pub use token_verifier_jwt::*;
pub use user_service_impl::*;
