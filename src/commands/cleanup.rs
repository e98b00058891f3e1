use crate::{
    config::Config,
    core::check_inactivity_period,
    errors::Result,
    github::{BranchReaper, GhApi, GitHubApi, Outcome, ReapOptions},
};
use chrono::{DateTime, Utc};
use clap::Args;

#[derive(Debug, Args)]
pub struct Cleanup {
    /// Simulate the deletion process without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Months of inactivity required before deletion (at least 6)
    #[arg(long, default_value_t = 6, allow_negative_numbers = true)]
    pub months: i64,

    /// Additional branch names that must never be deleted
    #[arg(long = "exclude", value_name = "BRANCH")]
    pub exclude: Vec<String>,

    /// Keep deleting after a failed deletion and report failures at the end
    #[arg(long)]
    pub keep_going: bool,
}

impl Cleanup {
    pub fn execute(&self) -> Result<Outcome> {
        self.execute_with(
            || {
                let config = Config::from_env()?;
                Ok(GhApi::new(config.token, config.repository))
            },
            Utc::now(),
        )
    }

    /// The period is checked before `connect` runs, so a bad period never
    /// reads the environment or reaches the remote service.
    pub fn execute_with<T, F>(&self, connect: F, now: DateTime<Utc>) -> Result<Outcome>
    where
        T: GitHubApi,
        F: FnOnce() -> Result<T>,
    {
        check_inactivity_period(self.months)?;

        println!("Running GitHub branch cleanup | Offset months: {}", self.months);

        let reaper = BranchReaper::new(connect()?);
        reaper.run(&self.options(), now)
    }

    fn options(&self) -> ReapOptions {
        ReapOptions {
            months: self.months,
            dry_run: self.dry_run,
            keep_going: self.keep_going,
            extra_excluded: self.exclude.clone(),
        }
    }
}
