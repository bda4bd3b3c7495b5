//! Extension archive ingestion.
//!
//! Uploaded extensions arrive as zip archives with a single top-level
//! folder containing the package. Extraction validates the archive shape,
//! reads the bundled manifest, and re-roots the contents under the
//! packages root at the path derived from the manifest `code` — the
//! archive's own folder name does not dictate where the package lands.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::MANIFEST_FILENAME;
use crate::error::{Error, Result};
use crate::ident;
use crate::manifest::PackageManifest;

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedArchive {
        reason: reason.into(),
    }
}

/// Extract an extension archive under the packages root.
///
/// Returns the extension code declared in the bundled manifest. Entries
/// are extracted into a staging directory and moved into place only once
/// the whole archive has been written, so a failure partway leaves an
/// already-present package at the destination untouched. A successful
/// extraction replaces the destination wholesale.
pub fn extract_archive(zip_path: &Path, packages_root: &Path) -> Result<String> {
    let file = File::open(zip_path).map_err(|e| Error::io(zip_path, e))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| malformed(format!("unreadable archive: {e}")))?;

    let top = top_level_dir(&mut archive)?;
    let manifest = read_bundled_manifest(&mut archive, &top)?;

    let code = manifest
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| malformed("manifest declares no extension code"))?;
    if ident::check_name(code).is_none() {
        return Err(Error::InvalidPackageName {
            name: code.to_string(),
        });
    }
    let code = code.to_string();

    let staging = packages_root.join(format!(".extract-{}.tmp", std::process::id()));
    let _ = fs::remove_dir_all(&staging);
    if let Err(e) = extract_into(&mut archive, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    let dest = packages_root.join(ident::name_path(&code));
    if dest.is_dir() {
        fs::remove_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::rename(&staging, &dest).map_err(|e| Error::io(&dest, e))?;

    tracing::info!(code = %code, dest = %dest.display(), "Extracted extension archive");
    Ok(code)
}

/// The single top-level directory every entry must live under.
fn top_level_dir(archive: &mut ZipArchive<File>) -> Result<String> {
    let mut top: Option<String> = None;

    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| malformed(format!("unreadable entry: {e}")))?;
        let path = entry
            .enclosed_name()
            .ok_or_else(|| malformed(format!("unsafe entry path {:?}", entry.name())))?;

        let Some(Component::Normal(first)) = path.components().next() else {
            return Err(malformed(format!("unsafe entry path {:?}", entry.name())));
        };
        let first = first
            .to_str()
            .ok_or_else(|| malformed("non-UTF-8 entry path"))?;

        match &top {
            None => top = Some(first.to_string()),
            Some(existing) if existing == first => {}
            Some(_) => return Err(malformed("archive has more than one top-level folder")),
        }
    }

    let top = top.ok_or_else(|| malformed("archive is empty"))?;
    if ident::check_name(&top).is_none() {
        return Err(malformed(format!("invalid top-level folder name {top:?}")));
    }
    Ok(top)
}

/// Read the manifest at `<top>/extension.json`, matched case-insensitively.
fn read_bundled_manifest(archive: &mut ZipArchive<File>, top: &str) -> Result<PackageManifest> {
    let expected = format!("{top}/{MANIFEST_FILENAME}");
    let index = (0..archive.len()).find(|&i| {
        archive
            .name_for_index(i)
            .is_some_and(|name| name.eq_ignore_ascii_case(&expected))
    });
    let Some(index) = index else {
        return Err(malformed(format!("archive has no {expected}")));
    };

    let mut entry = archive
        .by_index(index)
        .map_err(|e| malformed(format!("unreadable entry: {e}")))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| malformed(format!("unreadable manifest: {e}")))?;

    PackageManifest::from_json(&content)
        .map_err(|e| malformed(format!("invalid bundled manifest: {e}")))
}

/// Extract every entry into `dest`, stripping the top-level folder.
fn extract_into(archive: &mut ZipArchive<File>, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| malformed(format!("unreadable entry: {e}")))?;
        let path = entry
            .enclosed_name()
            .ok_or_else(|| malformed(format!("unsafe entry path {:?}", entry.name())))?;

        let relative: PathBuf = path.components().skip(1).collect();
        if relative.as_os_str().is_empty() {
            continue;
        }
        if !ext_fs::is_confined_relative(&relative) {
            return Err(malformed(format!("unsafe entry path {:?}", entry.name())));
        }

        let target = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| Error::io(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| Error::io(&target, e))?;
    }

    Ok(())
}
