mod identity_directory_mysql;
mod user_repo_mysql;

pub use identity_directory_mysql::*;
pub use user_repo_mysql::*;

mod util;
