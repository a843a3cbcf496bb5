//! Note reads and crash-safe note writes

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Replace `path` with `content` so readers see either the old or the new
/// note, never a torn one.
///
/// The bytes go to a locked sibling temp file which is then renamed over the
/// target. Missing parent directories are created. The temp file is removed
/// if anything fails before the rename.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();
    if let Some(dir) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let staging = staging_path(&target);
    let staged = stage(&staging, &target, content);
    if let Err(err) = staged {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }

    fs::rename(&staging, &target).map_err(|e| {
        let _ = fs::remove_file(&staging);
        Error::io(&target, e)
    })
}

/// `.<name>.<pid>.tmp` next to the target, so the rename never crosses
/// filesystems.
fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

fn stage(staging: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(staging)
        .map_err(|e| Error::io(staging, e))?;

    let lock_failed = |_| Error::LockFailed {
        path: target.to_path_buf(),
    };
    file.lock_exclusive().map_err(lock_failed)?;
    file.write_all(content).map_err(|e| Error::io(staging, e))?;
    file.sync_all().map_err(|e| Error::io(staging, e))?;
    file.unlock().map_err(lock_failed)
}

pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native = path.to_native();
    fs::read(&native).map_err(|e| Error::io(native, e))
}

pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    fs::read_to_string(&native).map_err(|e| Error::io(native, e))
}

/// [`write_atomic`] for text.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Stamp an existing file with `modified`.
///
/// Downloaded notes carry the vault's modification time so the next pass
/// sees both sides as equal.
pub fn set_modified(path: &NormalizedPath, modified: SystemTime) -> Result<()> {
    let native = path.to_native();
    File::options()
        .write(true)
        .open(&native)
        .and_then(|file| file.set_modified(modified))
        .map_err(|e| Error::io(native, e))
}
