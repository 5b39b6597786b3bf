use crate::error::{ForkfetchError, Result};
use serde::Deserialize;
use url::Url;

/// One discovered repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub name: String,
    pub owner_login: String,
    pub clone_url: Url,
}

/// Which repositories to discover and how their local directories are named.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Every fork of `owner/name`.
    Forks { name: String },
    /// Every repository of the organization whose name starts with `prefix-`.
    Classroom { prefix: String },
}

impl Selection {
    pub fn new(name: &str, classroom: bool) -> Self {
        if classroom {
            Selection::Classroom {
                prefix: name.to_string(),
            }
        } else {
            Selection::Forks {
                name: name.to_string(),
            }
        }
    }

    pub fn matches(&self, repo_name: &str) -> bool {
        match self {
            Selection::Forks { .. } => true,
            Selection::Classroom { prefix } => repo_name
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('-')),
        }
    }
}

/// `owner/name`, parsed from `owner/name` or `https://github.com/owner/name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(input: &str) -> Result<Self> {
        let path = input.strip_prefix("https://github.com/").unwrap_or(input);
        let invalid = || ForkfetchError::InvalidRepo(input.to_string());

        let (owner, name) = path.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

/// One page of a cursor-paged listing.
#[derive(Clone, Debug, Default)]
pub struct Page {
    pub nodes: Vec<RepoNode>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RepoNode {
    pub name: String,
    pub url: String,
    pub owner: OwnerNode,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OwnerNode {
    pub login: String,
}

impl RepoNode {
    pub fn into_descriptor(self) -> Result<RepositoryDescriptor> {
        Ok(RepositoryDescriptor {
            clone_url: Url::parse(&self.url)?,
            name: self.name,
            owner_login: self.owner.login,
        })
    }
}

// GraphQL response shapes

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ForksData {
    pub repository: Option<ForksRepository>,
}

#[derive(Debug, Deserialize)]
pub struct ForksRepository {
    pub forks: Connection,
}

#[derive(Debug, Deserialize)]
pub struct OrgData {
    pub organization: Option<OrgRepositories>,
}

#[derive(Debug, Deserialize)]
pub struct OrgRepositories {
    pub repositories: Connection,
}

#[derive(Debug, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub nodes: Vec<Option<RepoNode>>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
}

impl From<Connection> for Page {
    fn from(conn: Connection) -> Self {
        Page {
            nodes: conn.nodes.into_iter().flatten().collect(),
            end_cursor: conn.page_info.end_cursor,
            has_next_page: conn.page_info.has_next_page,
        }
    }
}
