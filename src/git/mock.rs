use crate::error::Result;
use crate::git::Repository;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Mock repository for testing without actual git operations.
///
/// Holds canned describe/hash/branch/clean state and records the commits
/// and tags that orchestration asks for, so tests can assert on the
/// persistence side effects without a real repository.
pub struct MockRepository {
    pub root: PathBuf,
    pub describe: String,
    pub head_hash: String,
    pub branch: String,
    pub clean: bool,
    commits: RefCell<Vec<(PathBuf, String)>>,
    tags: RefCell<Vec<(String, String)>>,
}

impl MockRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MockRepository {
            root: root.into(),
            describe: "v0.1.0-0-gab12cd3".to_string(),
            head_hash: "ab12cd34ff00112233445566778899aabbccddee".to_string(),
            branch: "main".to_string(),
            clean: true,
            commits: RefCell::new(Vec::new()),
            tags: RefCell::new(Vec::new()),
        }
    }

    pub fn with_describe(mut self, describe: impl Into<String>) -> Self {
        self.describe = describe.into();
        self
    }

    pub fn with_head_hash(mut self, hash: impl Into<String>) -> Self {
        self.head_hash = hash.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_dirty(mut self) -> Self {
        self.clean = false;
        self
    }

    /// Commits recorded through [Repository::commit_file].
    pub fn recorded_commits(&self) -> Vec<(PathBuf, String)> {
        self.commits.borrow().clone()
    }

    /// Tags recorded through [Repository::create_annotated_tag].
    pub fn recorded_tags(&self) -> Vec<(String, String)> {
        self.tags.borrow().clone()
    }
}

impl Repository for MockRepository {
    fn root(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn describe(&self) -> Result<String> {
        Ok(self.describe.clone())
    }

    fn head_hash(&self) -> Result<String> {
        Ok(self.head_hash.clone())
    }

    fn branch_name(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(self.clean)
    }

    fn commit_file(&self, path: &Path, message: &str) -> Result<()> {
        self.commits
            .borrow_mut()
            .push((path.to_path_buf(), message.to_string()));
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        self.tags
            .borrow_mut()
            .push((name.to_string(), message.to_string()));
        Ok(())
    }
}
