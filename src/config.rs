use crate::errors::{ReaperError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepositoryId {
    type Err = ReaperError;

    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(r"^(?P<owner>[A-Za-z0-9_.-]+)/(?P<name>[A-Za-z0-9_.-]+)$")
            .map_err(|_| ReaperError::InvalidRepository(s.to_string()))?;

        let caps = re
            .captures(s.trim())
            .ok_or_else(|| ReaperError::InvalidRepository(s.to_string()))?;

        Ok(RepositoryId {
            owner: caps["owner"].to_string(),
            name: caps["name"].to_string(),
        })
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything the run needs from the environment, validated once at startup.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub repository: RepositoryId,
}

// Keep the token out of debug output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"***")
            .field("repository", &self.repository)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = required(&lookup, TOKEN_VAR)?;
        let repository = required(&lookup, REPOSITORY_VAR)?.parse()?;

        log::debug!("Loaded configuration for {}", repository);

        Ok(Config { token, repository })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ReaperError::MissingEnv(key))
}
