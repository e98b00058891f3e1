use crate::core::{check_inactivity_period, cutoff_date, excluded_branches, is_stale};
use crate::errors::{ReaperError, Result};
use crate::github::GitHubApi;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ReapOptions {
    pub months: i64,
    pub dry_run: bool,
    pub keep_going: bool,
    pub extra_excluded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NothingToDelete,
    Simulated(Vec<String>),
    Deleted(Vec<String>),
}

pub struct BranchReaper<T: GitHubApi> {
    pub github: T,
}

impl<T: GitHubApi> BranchReaper<T> {
    pub fn new(github: T) -> Self {
        Self { github }
    }

    pub fn run(&self, options: &ReapOptions, now: DateTime<Utc>) -> Result<Outcome> {
        check_inactivity_period(options.months)?;

        if !self.github.is_available()? {
            log::error!("GitHub CLI (gh) not found. Install it from https://cli.github.com/");
            return Err(ReaperError::GitHubCliNotFound);
        }

        let default_branch = self.github.default_branch()?;
        let excluded = excluded_branches(&default_branch, &options.extra_excluded);
        log::info!("Excluded branches: {:?}", excluded);

        let cutoff = cutoff_date(now, options.months)?;
        println!("Cutoff date: {}", cutoff);

        let stale = self.stale_branches(cutoff, &excluded)?;
        self.delete_branches(&stale, options.dry_run, options.keep_going)
    }

    /// Names of non-excluded branches whose head commit is at or before `cutoff`,
    /// in listing order.
    pub fn stale_branches(&self, cutoff: DateTime<Utc>, excluded: &HashSet<String>) -> Result<Vec<String>> {
        let mut stale = Vec::new();

        for branch in self.github.branches() {
            let branch = branch?;
            if excluded.contains(&branch.name) {
                log::debug!("Skipping protected branch '{}'", branch.name);
                continue;
            }

            let commit = self.github.commit(&branch.commit.sha)?;
            let last_commit = commit.authored_at();
            log::debug!("Head of '{}' is {}", branch.name, commit.sha);

            println!("Checking branch '{}' | Last commit: {}", branch.name, last_commit);

            if is_stale(last_commit, cutoff) {
                stale.push(branch.name);
            }
        }

        log::info!("{} stale branch(es) found", stale.len());
        Ok(stale)
    }

    pub fn delete_branches(&self, branches: &[String], dry_run: bool, keep_going: bool) -> Result<Outcome> {
        if branches.is_empty() {
            println!("No branches meet the criteria for deletion.");
            return Ok(Outcome::NothingToDelete);
        }

        if dry_run {
            println!("Dry-run mode: The following branches would be deleted:");
            for branch in branches {
                println!("- {}", branch);
            }
            return Ok(Outcome::Simulated(branches.to_vec()));
        }

        let mut deleted = Vec::new();
        let mut failed = 0;

        for branch in branches {
            match self.github.delete_branch(branch) {
                Ok(()) => {
                    println!("Deleted branch: {}", branch);
                    deleted.push(branch.clone());
                }
                Err(e) if keep_going => {
                    log::error!("Failed to delete branch '{}': {}", branch, e);
                    eprintln!("Failed to delete branch: {} ({})", branch, e);
                    failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if failed > 0 {
            return Err(ReaperError::DeletionFailed {
                failed,
                total: branches.len(),
            });
        }

        Ok(Outcome::Deleted(deleted))
    }
}
