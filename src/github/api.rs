use crate::config::RepositoryId;
use crate::errors::{ReaperError, Result};
use crate::github::types::{Branch, Commit, Repository};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use std::process::Command;

const PER_PAGE: usize = 100;

/// Characters escaped in a ref path. `/` stays so `feature/x` keeps its segments.
const REF_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

pub trait GitHubApi {
    fn is_available(&self) -> Result<bool>;
    fn default_branch(&self) -> Result<String>;
    /// One-shot walk over the repository's branches. Call again to re-list.
    fn branches(&self) -> Box<dyn Iterator<Item = Result<Branch>> + '_>;
    fn commit(&self, sha: &str) -> Result<Commit>;
    fn delete_branch(&self, name: &str) -> Result<()>;
}

/// REST access through `gh api`, authenticated with the configured token.
pub struct GhApi {
    token: String,
    repository: RepositoryId,
}

impl GhApi {
    pub fn new(token: String, repository: RepositoryId) -> Self {
        Self { token, repository }
    }

    fn repo_path(&self) -> String {
        format!("repos/{}/{}", self.repository.owner, self.repository.name)
    }

    fn run_command(&self, args: &[&str]) -> Result<std::process::Output> {
        log::debug!("gh api {}", args.join(" "));

        let output = Command::new("gh")
            .arg("api")
            .args(["-H", "Accept: application/vnd.github+json"])
            .args(args)
            .env("GH_TOKEN", &self.token)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReaperError::GitHubCli(stderr.trim().to_string()));
        }

        Ok(output)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let output = self.run_command(&[path])?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    fn branch_page(&self, page: usize) -> Result<Vec<Branch>> {
        log::debug!("Fetching branch page {}", page);
        self.get(&format!(
            "{}/branches?per_page={}&page={}",
            self.repo_path(),
            PER_PAGE,
            page
        ))
    }
}

impl GitHubApi for GhApi {
    fn is_available(&self) -> Result<bool> {
        match Command::new("gh").arg("--version").output() {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false),
        }
    }

    fn default_branch(&self) -> Result<String> {
        let repository: Repository = self.get(&self.repo_path())?;
        log::info!("Default branch of {}: {}", repository.full_name, repository.default_branch);
        Ok(repository.default_branch)
    }

    fn branches(&self) -> Box<dyn Iterator<Item = Result<Branch>> + '_> {
        Box::new(BranchPages::new(|page| self.branch_page(page)))
    }

    fn commit(&self, sha: &str) -> Result<Commit> {
        self.get(&format!("{}/commits/{}", self.repo_path(), sha))
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let path = format!("{}/git/refs/heads/{}", self.repo_path(), encode_ref(name));

        self.run_command(&["--method", "DELETE", path.as_str()])
            .map(|_| ())
            .map_err(|e| delete_error(name, e))
    }
}

/// GitHub answers a delete of a missing ref with 422 "Reference does not exist"
/// or 404 "Not Found".
fn delete_error(name: &str, err: ReaperError) -> ReaperError {
    match err {
        ReaperError::GitHubCli(ref error)
            if error.contains("Reference does not exist") || error.contains("Not Found") =>
        {
            ReaperError::BranchNotFound(name.to_string())
        }
        e => e,
    }
}

/// Forward-only walk over a paged listing. A short page is the last one; a
/// failed fetch is yielded once and ends the walk.
pub struct BranchPages<F> {
    fetch: F,
    next_page: Option<usize>,
    buffered: std::vec::IntoIter<Branch>,
}

impl<F> BranchPages<F>
where
    F: FnMut(usize) -> Result<Vec<Branch>>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            next_page: Some(1),
            buffered: Vec::new().into_iter(),
        }
    }
}

impl<F> Iterator for BranchPages<F>
where
    F: FnMut(usize) -> Result<Vec<Branch>>,
{
    type Item = Result<Branch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(branch) = self.buffered.next() {
                return Some(Ok(branch));
            }

            let page = self.next_page?;
            match (self.fetch)(page) {
                Ok(branches) => {
                    self.next_page = if branches.len() < PER_PAGE { None } else { Some(page + 1) };
                    self.buffered = branches.into_iter();
                }
                Err(e) => {
                    self.next_page = None;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Percent-encode a branch name for use as a path, keeping `/` separators.
fn encode_ref(name: &str) -> String {
    utf8_percent_encode(name, REF_PATH).to_string()
}

#[cfg(test)]
pub struct MockGitHubApi {
    pub available: bool,
    pub default_branch: String,
    pub branches: Vec<(String, chrono::DateTime<chrono::Utc>)>,
    pub failing_deletes: std::collections::HashSet<String>,
    pub listings: std::sync::Mutex<usize>,
    pub commit_lookups: std::sync::Mutex<Vec<String>>,
    pub deleted: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockGitHubApi {
    pub fn new(default_branch: &str) -> Self {
        Self {
            available: true,
            default_branch: default_branch.to_string(),
            branches: Vec::new(),
            failing_deletes: std::collections::HashSet::new(),
            listings: std::sync::Mutex::new(0),
            commit_lookups: std::sync::Mutex::new(Vec::new()),
            deleted: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_branch(mut self, name: &str, last_commit: chrono::DateTime<chrono::Utc>) -> Self {
        self.branches.push((name.to_string(), last_commit));
        self
    }

    pub fn failing_delete(mut self, name: &str) -> Self {
        self.failing_deletes.insert(name.to_string());
        self
    }

    pub fn set_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn get_listings(&self) -> usize {
        *self.listings.lock().unwrap()
    }

    pub fn get_commit_lookups(&self) -> Vec<String> {
        self.commit_lookups.lock().unwrap().clone()
    }

    pub fn get_deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn sha_for(index: usize) -> String {
        format!("{:040x}", index + 1)
    }
}

#[cfg(test)]
impl GitHubApi for MockGitHubApi {
    fn is_available(&self) -> Result<bool> {
        Ok(self.available)
    }

    fn default_branch(&self) -> Result<String> {
        Ok(self.default_branch.clone())
    }

    fn branches(&self) -> Box<dyn Iterator<Item = Result<Branch>> + '_> {
        *self.listings.lock().unwrap() += 1;
        Box::new(self.branches.iter().enumerate().map(|(index, (name, _))| {
            Ok(Branch {
                name: name.clone(),
                commit: crate::github::types::CommitRef { sha: Self::sha_for(index) },
            })
        }))
    }

    fn commit(&self, sha: &str) -> Result<Commit> {
        self.commit_lookups.lock().unwrap().push(sha.to_string());

        let (_, date) = (0..self.branches.len())
            .find(|index| Self::sha_for(*index) == sha)
            .map(|index| &self.branches[index])
            .ok_or_else(|| ReaperError::GitHubCli(format!("No commit found for SHA: {}", sha)))?;

        Ok(Commit {
            sha: sha.to_string(),
            commit: crate::github::types::CommitDetails {
                author: crate::github::types::Signature { date: *date },
            },
        })
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        if self.failing_deletes.contains(name) {
            return Err(ReaperError::GitHubCli(format!("cannot delete {}", name)));
        }
        self.deleted.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
