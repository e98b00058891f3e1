pub mod api;
pub mod reaper;
pub mod types;


pub use api::{GhApi, GitHubApi};
pub use reaper::{BranchReaper, Outcome, ReapOptions};
