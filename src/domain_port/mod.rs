mod identity_directory;
mod user_repo;

pub use identity_directory::*;
pub use user_repo::*;
