use crate::github::types::{RepositoryDescriptor, Selection};

/// One `git clone` to perform, relative to the base directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloneTask {
    pub local_directory: String,
    pub source_url: String,
}

impl CloneTask {
    /// Forks are named after their owner, classroom repos after the student
    /// suffix following `prefix-`.
    pub fn from_descriptor(repo: &RepositoryDescriptor, selection: &Selection) -> Self {
        let local_directory = match selection {
            Selection::Forks { .. } => repo.owner_login.clone(),
            Selection::Classroom { prefix } => repo
                .name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('-'))
                .unwrap_or(&repo.name)
                .to_string(),
        };
        Self {
            local_directory,
            source_url: repo.clone_url.to_string(),
        }
    }

    /// The directory is passed to git positionally, so it must not be empty
    /// or look like an option.
    pub fn unsafe_directory(&self) -> Option<String> {
        let dir = &self.local_directory;
        (dir.is_empty() || dir.starts_with('-')).then(|| dir.clone())
    }

    pub fn argv(&self, dry_run: bool) -> Vec<String> {
        let mut args = Vec::with_capacity(5);
        if dry_run {
            args.push("echo".to_string());
        }
        args.extend([
            "git".to_string(),
            "clone".to_string(),
            self.source_url.clone(),
            self.local_directory.clone(),
        ]);
        args
    }
}

pub fn plan(repos: &[RepositoryDescriptor], selection: &Selection) -> Vec<CloneTask> {
    repos
        .iter()
        .map(|repo| CloneTask::from_descriptor(repo, selection))
        .collect()
}
