use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Environment variable naming the object directory directly.
pub const OBJECT_DIRECTORY_ENV: &str = "GIT_OBJECT_DIRECTORY";
/// Environment variable naming the repository's git directory.
pub const GIT_DIR_ENV: &str = "GIT_DIR";

/// Finds the object directory to scan.
///
/// Resolution order:
/// 1. `object_directory` (from `GIT_OBJECT_DIRECTORY`)
/// 2. `<git_dir>/objects` (from `GIT_DIR`)
/// 3. the nearest ancestor of `cwd` holding a `.git` directory, a `.git`
///    file with a `gitdir:` line, or a bare repository layout
///
/// Relative settings resolve against `cwd`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectDirLocator {
    pub object_directory: Option<PathBuf>,
    pub git_dir: Option<PathBuf>,
    pub cwd: PathBuf,
}

impl ObjectDirLocator {
    /// Read the settings from the process environment.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self {
            object_directory: non_empty_var(OBJECT_DIRECTORY_ENV),
            git_dir: non_empty_var(GIT_DIR_ENV),
            cwd: env::current_dir()?,
        })
    }

    /// Discover from `cwd` alone.
    pub fn discover_from(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    pub fn locate(&self) -> StoreResult<PathBuf> {
        if let Some(dir) = &self.object_directory {
            return Ok(self.cwd.join(dir));
        }
        if let Some(git_dir) = &self.git_dir {
            return Ok(self.cwd.join(git_dir).join("objects"));
        }

        for dir in self.cwd.ancestors() {
            let dot_git = dir.join(".git");
            match fs::metadata(&dot_git) {
                Ok(meta) if meta.is_dir() => return Ok(dot_git.join("objects")),
                Ok(meta) if meta.is_file() => return Ok(read_gitfile(&dot_git)?.join("objects")),
                _ => {}
            }
            if is_bare_repository(dir) {
                return Ok(dir.join("objects"));
            }
        }
        Err(StoreError::NotARepository(self.cwd.clone()))
    }
}

fn non_empty_var(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Follow a `.git` file of the form `gitdir: <path>`.
fn read_gitfile(path: &Path) -> StoreResult<PathBuf> {
    let content = fs::read_to_string(path)?;
    let target = content
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("gitdir:"))
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .ok_or_else(|| StoreError::InvalidGitFile(path.to_path_buf()))?;

    let target = PathBuf::from(target);
    if target.is_absolute() {
        return Ok(target);
    }
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(base.join(target))
}

fn is_bare_repository(dir: &Path) -> bool {
    dir.join("HEAD").is_file() && dir.join("objects").is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_object_directory_wins() {
        let locator = ObjectDirLocator {
            object_directory: Some("/srv/objects".into()),
            git_dir: Some("/srv/repo.git".into()),
            cwd: "/work".into(),
        };
        assert_eq!(locator.locate().unwrap(), PathBuf::from("/srv/objects"));
    }

    #[test]
    fn relative_settings_resolve_against_cwd() {
        let locator = ObjectDirLocator {
            object_directory: None,
            git_dir: Some("repo.git".into()),
            cwd: "/work".into(),
        };
        assert_eq!(locator.locate().unwrap(), PathBuf::from("/work/repo.git/objects"));
    }

    #[test]
    fn discovers_dot_git_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git").join("objects")).unwrap();
        let nested = dir.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let found = ObjectDirLocator::discover_from(&nested).locate().unwrap();
        assert_eq!(found, dir.path().join(".git").join("objects"));
    }

    #[test]
    fn follows_gitfile() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("modules").join("sub");
        fs::create_dir_all(&real).unwrap();
        let work = dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join(".git"), "gitdir: ../modules/sub\n").unwrap();

        let found = ObjectDirLocator::discover_from(&work).locate().unwrap();
        assert_eq!(found, work.join("../modules/sub").join("objects"));
    }

    #[test]
    fn rejects_malformed_gitfile() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".git"), "nonsense\n").unwrap();
        let err = ObjectDirLocator::discover_from(dir.path())
            .locate()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidGitFile(_)));
    }

    #[test]
    fn discovers_bare_repository() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join("repo.git");
        fs::create_dir_all(bare.join("objects")).unwrap();
        fs::write(bare.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        let found = ObjectDirLocator::discover_from(&bare).locate().unwrap();
        assert_eq!(found, bare.join("objects"));
    }
}
