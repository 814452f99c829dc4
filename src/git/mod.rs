//! Git operations abstraction layer.
//!
//! The resolve pipeline only ever consumes a [RepositoryDescriptor]; the
//! [Repository] trait is the narrow seam through which it is captured and
//! through which version bumps persist their results (commit + annotated
//! tag). Concrete implementations:
//!
//! - [repository::Git2Repository]: the real thing, backed by the `git2` crate
//! - [mock::MockRepository]: canned state for tests
//!
//! Code above this module should depend on the trait, not the
//! implementations.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::RepositoryDescriptor;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Common git operation trait for abstraction.
///
/// The build pipeline is strictly sequential, so no threading bounds are
/// imposed. Methods map underlying failures into
/// [crate::error::ReleasePlanError] variants.
pub trait Repository {
    /// The repository's working-tree root.
    fn root(&self) -> Result<PathBuf>;

    /// The long describe string: nearest tag, commit distance, abbreviated
    /// hash; a bare abbreviated hash when the repository has no tags.
    fn describe(&self) -> Result<String>;

    /// Full hash of the current HEAD commit.
    ///
    /// Fails on a repository without commits, which also enforces the
    /// descriptor's at-least-one-commit invariant.
    fn head_hash(&self) -> Result<String>;

    /// Name of the currently checked-out branch.
    fn branch_name(&self) -> Result<String>;

    /// Whether the working tree has no uncommitted changes (untracked files
    /// count as changes).
    fn is_clean(&self) -> Result<bool>;

    /// Stage one file and commit it with the given message.
    fn commit_file(&self, path: &Path, message: &str) -> Result<()>;

    /// Create an annotated tag on HEAD.
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Capture the immutable state snapshot for this build invocation.
    fn capture_descriptor(&self) -> Result<RepositoryDescriptor> {
        RepositoryDescriptor::new(
            self.root()?,
            self.describe()?,
            self.head_hash()?,
            self.branch_name()?,
            !self.is_clean()?,
        )
    }
}
