use crate::error::{ForkfetchError, Result};
use crate::github::lister::PageSource;
use crate::github::types::{ForksData, GraphQlResponse, OrgData, Page, Selection};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde_json::json;

const FORKS_QUERY: &str = "\
query($owner: String!, $name: String!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    forks(first: $first, after: $after) {
      nodes { name url owner { login } }
      pageInfo { endCursor hasNextPage }
    }
  }
}";

const ORG_REPOS_QUERY: &str = "\
query($owner: String!, $first: Int!, $after: String) {
  organization(login: $owner) {
    repositories(first: $first, after: $after) {
      nodes { name url owner { login } }
      pageInfo { endCursor hasNextPage }
    }
  }
}";

#[derive(Clone)]
pub struct GitHubClient {
    octo: Octocrab,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        let octo = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| ForkfetchError::GitHub(e.to_string()))?;

        Ok(Self { octo })
    }

    async fn query<T: DeserializeOwned + Send>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let payload = json!({ "query": query, "variables": variables });
        let response: GraphQlResponse<T> = self
            .octo
            .graphql(&payload)
            .await
            .map_err(|e| ForkfetchError::GitHub(e.to_string()))?;

        if !response.errors.is_empty() {
            let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(ForkfetchError::GitHub(messages.join("; ")));
        }
        response
            .data
            .ok_or_else(|| ForkfetchError::GitHub("response carried no data".to_string()))
    }
}

#[async_trait]
impl PageSource for GitHubClient {
    async fn fetch_page(
        &self,
        owner: &str,
        selection: &Selection,
        first: u32,
        after: Option<&str>,
    ) -> Result<Page> {
        match selection {
            Selection::Forks { name } => {
                let data: ForksData = self
                    .query(
                        FORKS_QUERY,
                        json!({ "owner": owner, "name": name, "first": first, "after": after }),
                    )
                    .await?;
                let repo = data.repository.ok_or_else(|| {
                    ForkfetchError::GitHub(format!("repository {owner}/{name} not found"))
                })?;
                Ok(repo.forks.into())
            }
            Selection::Classroom { .. } => {
                let data: OrgData = self
                    .query(
                        ORG_REPOS_QUERY,
                        json!({ "owner": owner, "first": first, "after": after }),
                    )
                    .await?;
                let org = data.organization.ok_or_else(|| {
                    ForkfetchError::GitHub(format!("organization {owner} not found"))
                })?;
                Ok(org.repositories.into())
            }
        }
    }
}
