use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForkfetchError {
    #[error("github error: {0}")]
    GitHub(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(
        "GITHUB_TOKEN is not set; create a personal access token at \
         https://help.github.com/articles/creating-a-personal-access-token-for-the-command-line/"
    )]
    MissingToken,

    #[error("repo must be in the format owner/repo, got {0:?}")]
    InvalidRepo(String),

    #[error("invalid clone url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{failed} of {total} clones failed")]
    ClonesFailed { failed: usize, total: usize },
}

/// Why a single clone did not succeed. Never aborts sibling clones.
#[derive(Error, Debug)]
pub enum CloneError {
    #[error("failed to launch: {0}")]
    Launch(#[from] std::io::Error),

    #[error("{0}")]
    Status(String),

    #[error("refusing to clone into {0:?}")]
    UnsafeDirectory(String),
}

pub type Result<T> = std::result::Result<T, ForkfetchError>;
