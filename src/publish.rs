//! Mirror the project tree into a clean publish directory.
//!
//! The publish directory is deleted and recreated on every run, then every
//! file and directory under the project root is copied into it verbatim.
//! The publish directory usually lives inside the project root, so it is
//! excluded from the walk by path (not by name: an unrelated `gh-pages/`
//! deeper in the tree is still mirrored). Extra paths can be excluded via
//! `publish.exclude`.
//!
//! ```text
//! project/                     gh-pages/
//! ├── index.html          →    ├── index.html
//! ├── css/style.css       →    ├── css/style.css
//! ├── devices.json        →    ├── devices.json
//! └── gh-pages/  (skipped)     └── ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Refusing to publish into {output}: it contains the source tree {source_root}")]
    OutputContainsSource { output: PathBuf, source_root: PathBuf },
}

/// What the mirror copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub files: usize,
    pub directories: usize,
    /// Excluded entries that existed in the source tree.
    pub skipped: Vec<PathBuf>,
}

/// Recreate `output` and mirror `source` into it.
///
/// `exclude` paths are relative to `source`. A missing `source` leaves an
/// empty `output` behind and is not an error.
pub fn publish(source: &Path, output: &Path, exclude: &[PathBuf]) -> Result<MirrorReport, PublishError> {
    let output_abs = absolute(output)?;
    let source_abs = if source.exists() {
        Some(source.canonicalize()?)
    } else {
        None
    };

    if let Some(source_abs) = &source_abs {
        if source_abs.starts_with(&output_abs) {
            return Err(PublishError::OutputContainsSource {
                output: output_abs,
                source_root: source_abs.clone(),
            });
        }
    }

    if output.exists() {
        fs::remove_dir_all(output)?;
    }
    fs::create_dir_all(output)?;

    let mut report = MirrorReport::default();
    let Some(source_abs) = source_abs else {
        return Ok(report);
    };

    let mut excluded = vec![output.canonicalize()?];
    excluded.extend(exclude.iter().map(|p| source_abs.join(p)));

    let mut skipped = Vec::new();
    let walker = WalkDir::new(&source_abs)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let skip = excluded.iter().any(|x| entry.path() == x);
            if skip {
                skipped.push(entry.path().to_path_buf());
            }
            !skip
        });

    let mut copies = Vec::new();
    for entry in walker {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(&source_abs) else {
            continue;
        };
        copies.push((entry.file_type().is_dir(), entry.path().to_path_buf(), output.join(rel)));
    }
    report.skipped = skipped;

    for (is_dir, from, to) in copies {
        if is_dir {
            fs::create_dir_all(&to)?;
            report.directories += 1;
        } else {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&from, &to)?;
            report.files += 1;
        }
    }

    Ok(report)
}

/// Absolute form of `path`, resolving symlinks when it already exists.
fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.exists() {
        path.canonicalize()
    } else {
        std::path::absolute(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn mirrors_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("project");
        write(&src, "index.html", "<html>");
        write(&src, "css/style.css", "body {}");
        write(&src, "js/lib/app.js", "1;");
        let out = tmp.path().join("out");

        let report = publish(&src, &out, &[]).unwrap();

        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "<html>");
        assert_eq!(fs::read_to_string(out.join("css/style.css")).unwrap(), "body {}");
        assert_eq!(fs::read_to_string(out.join("js/lib/app.js")).unwrap(), "1;");
        assert_eq!(report.files, 3);
        assert_eq!(report.directories, 3);
    }

    #[test]
    fn output_inside_source_is_not_mirrored_into_itself() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path();
        write(src, "index.html", "home");
        write(src, "gh-pages/stale.html", "old");
        let out = src.join("gh-pages");

        let report = publish(src, &out, &[]).unwrap();

        assert!(out.join("index.html").exists());
        assert!(!out.join("gh-pages").exists());
        assert!(!out.join("stale.html").exists());
        assert_eq!(report.skipped, vec![out.canonicalize().unwrap()]);
    }

    #[test]
    fn same_named_directory_elsewhere_is_mirrored() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path();
        write(src, "docs/gh-pages/note.txt", "keep me");
        let out = src.join("gh-pages");

        publish(src, &out, &[]).unwrap();

        assert_eq!(
            fs::read_to_string(out.join("docs/gh-pages/note.txt")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn stale_output_is_removed() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src, "a.txt", "a");
        let out = tmp.path().join("out");
        write(&out, "leftover.txt", "stale");

        publish(&src, &out, &[]).unwrap();

        assert!(out.join("a.txt").exists());
        assert!(!out.join("leftover.txt").exists());
    }

    #[test]
    fn missing_source_is_noop() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");

        let report = publish(&tmp.path().join("nope"), &out, &[]).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
        assert_eq!(report, MirrorReport::default());
    }

    #[test]
    fn extra_exclusions_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src, ".git/HEAD", "ref");
        write(&src, "site/index.html", "x");
        let out = tmp.path().join("out");

        publish(&src, &out, &[PathBuf::from(".git")]).unwrap();

        assert!(!out.join(".git").exists());
        assert!(out.join("site/index.html").exists());
    }

    #[test]
    fn refuses_output_that_contains_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("project");
        write(&src, "index.html", "x");

        let err = publish(&src, tmp.path(), &[]).unwrap_err();
        assert!(matches!(err, PublishError::OutputContainsSource { .. }));
        // Nothing was deleted
        assert!(src.join("index.html").exists());

        let err = publish(&src, &src, &[]).unwrap_err();
        assert!(matches!(err, PublishError::OutputContainsSource { .. }));
    }

    #[test]
    fn copies_are_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let bytes: Vec<u8> = (0..=255u8).collect();
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("blob.bin"), &bytes).unwrap();
        let out = tmp.path().join("out");

        publish(&src, &out, &[]).unwrap();

        assert_eq!(fs::read(out.join("blob.bin")).unwrap(), bytes);
    }
}
