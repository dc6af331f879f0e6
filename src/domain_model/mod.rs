mod friend;
mod graph;
mod transition;
mod user;

pub use friend::*;
pub use graph::*;
pub use transition::*;
pub use user::*;
