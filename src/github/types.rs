use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub default_branch: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}`, only the fields we read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommitDetails {
    pub author: Signature,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Signature {
    pub date: DateTime<Utc>,
}

impl Commit {
    pub fn authored_at(&self) -> DateTime<Utc> {
        self.commit.author.date
    }
}
