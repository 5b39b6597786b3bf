#![cfg(test)]

use crate::clone::runner::{CommandOutput, CommandRunner};
use crate::clone::task::CloneTask;
use crate::error::Result;
use crate::github::lister::PageSource;
use crate::github::types::*;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn descriptor(name: &str, owner: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        name: name.to_string(),
        owner_login: owner.to_string(),
        clone_url: url::Url::parse(&format!("https://github.com/{owner}/{name}")).unwrap(),
    }
}

fn node(name: &str, owner: &str) -> RepoNode {
    RepoNode {
        name: name.to_string(),
        url: format!("https://github.com/{owner}/{name}"),
        owner: OwnerNode {
            login: owner.to_string(),
        },
    }
}

/// `count` forks of `hello` owned by `user{start}`..
pub fn fork_page(start: usize, count: usize, cursor: Option<&str>, has_next_page: bool) -> Page {
    Page {
        nodes: (start..start + count)
            .map(|i| node("hello", &format!("user{i}")))
            .collect(),
        end_cursor: cursor.map(str::to_string),
        has_next_page,
    }
}

pub fn page_of(repos: &[(&str, &str)], cursor: Option<&str>, has_next_page: bool) -> Page {
    Page {
        nodes: repos.iter().map(|(name, owner)| node(name, owner)).collect(),
        end_cursor: cursor.map(str::to_string),
        has_next_page,
    }
}

/// Hands out pages in order and records every request.
#[derive(Clone)]
pub struct ScriptedPages {
    pages: Arc<Mutex<VecDeque<Result<Page>>>>,
    requests: Arc<Mutex<Vec<(u32, Option<String>)>>>,
}

impl ScriptedPages {
    pub fn new(pages: Vec<Result<Page>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn page_sizes(&self) -> Vec<u32> {
        self.requests.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }
}

#[async_trait]
impl PageSource for ScriptedPages {
    async fn fetch_page(
        &self,
        _owner: &str,
        _selection: &Selection,
        first: u32,
        after: Option<&str>,
    ) -> Result<Page> {
        self.requests
            .lock()
            .unwrap()
            .push((first, after.map(str::to_string)));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("lister requested more pages than scripted")
    }
}

pub fn url_for(i: usize) -> String {
    format!("https://github.com/user{i}/hello")
}

pub fn tasks(n: usize) -> Vec<CloneTask> {
    (0..n)
        .map(|i| CloneTask {
            local_directory: format!("user{i}"),
            source_url: url_for(i),
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// Pretends to clone: sleeps, tracks how many calls overlap, fails chosen URLs.
#[derive(Clone)]
pub struct RecordingRunner {
    delay: Duration,
    failing: Arc<HashSet<String>>,
    panicking: Arc<HashSet<String>>,
    unlaunchable: bool,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingRunner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failing: Arc::new(HashSet::new()),
            panicking: Arc::new(HashSet::new()),
            unlaunchable: false,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(mut self, urls: impl IntoIterator<Item = String>) -> Self {
        self.failing = Arc::new(urls.into_iter().collect());
        self
    }

    pub fn panicking(mut self, urls: impl IntoIterator<Item = String>) -> Self {
        self.panicking = Arc::new(urls.into_iter().collect());
        self
    }

    pub fn unlaunchable(mut self) -> Self {
        self.unlaunchable = true;
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, argv: &[String], cwd: Option<&Path>) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(RecordedCall {
            argv: argv.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
        });
        if self.unlaunchable {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "git: not found",
            ));
        }

        if argv.iter().any(|a| self.panicking.contains(a)) {
            panic!("runner blew up on {argv:?}");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failed = argv.iter().any(|a| self.failing.contains(a));
        Ok(CommandOutput {
            success: !failed,
            status: if failed {
                "exit status: 128".to_string()
            } else {
                "exit status: 0".to_string()
            },
            output: format!("{}\n", argv.join(" ")),
        })
    }
}

/// A `Write` sink whose contents can be read back after the writer is moved away.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
