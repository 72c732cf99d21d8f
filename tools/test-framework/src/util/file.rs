/*!
   Filesystem utilities.
*/

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Error;

/**
   Open a file in append mode, creating it if necessary.

   This is used to mirror the output of a child process into log files.
*/
pub fn open_append(file_path: impl AsRef<Path>) -> Result<File, Error> {
    let file = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(file_path)?;

    Ok(file)
}

/**
   Create a fresh work directory `<parent>/<name>`, removing leftovers of a
   previous run at the same path.
*/
pub fn fresh_dir(parent: impl AsRef<Path>, name: &str) -> Result<PathBuf, Error> {
    let dir = parent.as_ref().join(name);

    if dir.exists() {
        debug!("removing stale directory {}", dir.display());
        fs::remove_dir_all(&dir)?;
    }

    fs::create_dir_all(&dir)?;

    Ok(fs::canonicalize(dir)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::random::random_u32;

    #[test]
    fn fresh_dir_removes_previous_content() {
        let parent = std::env::temp_dir().join(format!("fresh-dir-{}", random_u32()));

        let dir = fresh_dir(&parent, "node").unwrap();
        fs::write(dir.join("stale.log"), "old").unwrap();

        let dir = fresh_dir(&parent, "node").unwrap();
        assert!(dir.is_absolute());
        assert!(!dir.join("stale.log").exists());

        fs::remove_dir_all(parent).unwrap();
    }
}
