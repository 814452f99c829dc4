use crate::error::{ReleasePlanError, Result};
use crate::git::Repository;
use git2::{DescribeFormatOptions, DescribeOptions, ObjectType, StatusOptions};
use std::path::{Path, PathBuf};

/// Real git repository implementation using the `git2` crate.
pub struct Git2Repository {
    repo: git2::Repository,
}

impl Git2Repository {
    /// Open the repository containing `path`, walking up parent
    /// directories like `git` itself does.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = git2::Repository::discover(path.as_ref()).map_err(|e| {
            ReleasePlanError::config(format!(
                "'{}' is not inside a git repository: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Git2Repository { repo })
    }
}

impl Repository for Git2Repository {
    fn root(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleasePlanError::config("Repository has no working tree"))
    }

    fn describe(&self) -> Result<String> {
        let mut options = DescribeOptions::new();
        options.describe_tags().show_commit_oid_as_fallback(true);
        let describe = self.repo.describe(&options)?;
        let mut format = DescribeFormatOptions::new();
        // 7-char abbreviation plus the 'g' marker gives the 8-character
        // alphanumeric hash segment the descriptor patterns expect.
        format.always_use_long_format(true).abbreviated_size(7);
        Ok(describe.format(Some(&format))?)
    }

    fn head_hash(&self) -> Result<String> {
        let head = self.repo.head()?;
        let oid = head
            .target()
            .ok_or_else(|| ReleasePlanError::config("HEAD is detached or invalid"))?;
        Ok(oid.to_string())
    }

    fn branch_name(&self) -> Result<String> {
        let head = self.repo.head()?;
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    fn is_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.is_empty())
    }

    fn commit_file(&self, path: &Path, message: &str) -> Result<()> {
        let workdir = self.root()?.canonicalize()?;
        let canonical = path.canonicalize()?;
        let relative = canonical.strip_prefix(&workdir).unwrap_or(path);
        let mut index = self.repo.index()?;
        index.add_path(relative)?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;
        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel(ObjectType::Commit)?;
        let signature = self.repo.signature()?;
        self.repo.tag(name, &head, &signature, message, false)?;
        Ok(())
    }
}
