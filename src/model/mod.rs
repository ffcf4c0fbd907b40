pub mod config;
pub mod mappers;
pub mod member;
pub mod project;
pub mod task;
pub mod team;

pub use config::*;
pub use member::*;
pub use project::*;
pub use task::*;
pub use team::*;
