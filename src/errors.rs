use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaperError {
    #[error("{0} environment variable is not set")]
    MissingEnv(&'static str),

    #[error("Invalid repository '{0}', expected \"owner/name\"")]
    InvalidRepository(String),

    #[error("The minimum inactivity period required is {minimum} months (got {months})")]
    PeriodTooShort { months: i64, minimum: i64 },

    #[error("Cannot compute a cutoff date {0} months in the past")]
    CutoffOutOfRange(i64),

    #[error("GitHub CLI operation failed: {0}")]
    GitHubCli(String),

    #[error("GitHub CLI not found")]
    GitHubCliNotFound,

    #[error("Branch '{0}' not found")]
    BranchNotFound(String),

    #[error("Failed to delete {failed} of {total} branches")]
    DeletionFailed { failed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReaperError {
    /// Errors raised before the remote service is contacted.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReaperError::MissingEnv(_)
                | ReaperError::InvalidRepository(_)
                | ReaperError::PeriodTooShort { .. }
                | ReaperError::CutoffOutOfRange(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReaperError>;
