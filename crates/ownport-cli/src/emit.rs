//! Writes migrated buffers to disk.

use std::io::{self, Write};

use camino::Utf8Path;
use tempfile::Builder;

/// Writes `contents` to `path` through a persisted temporary file.
///
/// The temporary file lives in the destination directory, so the final
/// rename never crosses a filesystem and a failed write leaves no partial
/// output behind.
pub(crate) fn atomic_write(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        Some(_) => Utf8Path::new("."),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "output path did not have a parent directory",
            ));
        }
    };

    let mut file = Builder::new()
        .prefix(path.file_name().unwrap_or("ownport"))
        .tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
