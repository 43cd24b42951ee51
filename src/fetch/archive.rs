//! Zip archive expansion.

use std::fs::File;
use std::path::Path;
use tracing::debug;

use super::error::FetchError;

const ARCHIVE_EXTENSIONS: &[&str] = &["zip"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp"];

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Whether a file name looks like an archive we can expand.
pub fn is_archive(name: &str) -> bool {
    has_extension(name, ARCHIVE_EXTENSIONS)
}

/// Whether an archive member is an image tile.
pub fn is_image(name: &str) -> bool {
    has_extension(name, IMAGE_EXTENSIONS)
}

/// Expand the members of `archive` accepted by `accept` into `target`.
///
/// Directory entries are implied by their files and skipped; members whose
/// names would land outside `target` are ignored. Returns the number of files
/// written.
pub fn extract_archive<P>(archive: &Path, target: &Path, mut accept: P) -> Result<usize, FetchError>
where
    P: FnMut(&str) -> bool,
{
    let file = File::open(archive).map_err(|e| FetchError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file)?;
    std::fs::create_dir_all(target).map_err(|e| FetchError::io(target, e))?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut member = zip.by_index(i)?;
        if member.is_dir() || !accept(member.name()) {
            continue;
        }
        let rel = match member.enclosed_name() {
            Some(p) => p,
            None => {
                debug!("Skipping unsafe archive member {}", member.name());
                continue;
            }
        };
        let out = target.join(rel);
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FetchError::io(parent, e))?;
        }
        let mut dest = File::create(&out).map_err(|e| FetchError::io(&out, e))?;
        std::io::copy(&mut member, &mut dest).map_err(|e| FetchError::io(&out, e))?;
        written += 1;
    }
    debug!("Extracted {} member(s) of {} into {}", written, archive.display(), target.display());
    Ok(written)
}
