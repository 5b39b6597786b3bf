use crate::error::Result;
use crate::github::types::{Page, RepositoryDescriptor, Selection};
use async_trait::async_trait;

/// A cursor-paged listing of repository summaries.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch up to `first` repositories following `after` (`None` for the first page).
    async fn fetch_page(
        &self,
        owner: &str,
        selection: &Selection,
        first: u32,
        after: Option<&str>,
    ) -> Result<Page>;
}

#[derive(Clone, Copy, Debug)]
pub struct ListerConfig {
    pub page_size: u32,
}

impl Default for ListerConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

pub struct RepositoryLister<S> {
    source: S,
    config: ListerConfig,
}

impl<S: PageSource> RepositoryLister<S> {
    pub fn new(source: S, config: ListerConfig) -> Self {
        Self { source, config }
    }

    /// Walk every page and return the matching repositories in server order.
    ///
    /// Any page error aborts the walk; nothing accumulated so far is returned.
    /// There is no page limit, a server that always reports another page is
    /// followed forever.
    pub async fn list(
        &self,
        owner: &str,
        selection: &Selection,
    ) -> Result<Vec<RepositoryDescriptor>> {
        let mut repos = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .source
                .fetch_page(owner, selection, self.config.page_size, cursor.as_deref())
                .await?;
            pages += 1;
            tracing::debug!(
                page = pages,
                nodes = page.nodes.len(),
                has_next_page = page.has_next_page,
                "fetched repository page"
            );

            for node in page.nodes {
                if selection.matches(&node.name) {
                    repos.push(node.into_descriptor()?);
                }
            }

            if !page.has_next_page {
                break;
            }
            cursor = page.end_cursor;
        }

        tracing::info!(owner, pages, repos = repos.len(), "listing complete");
        Ok(repos)
    }
}
