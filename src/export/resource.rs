//! Write selected resources to disk without overwriting anything.

use std::path::{Path, PathBuf};

use crate::error::{DecomposeError, Result};
use crate::model::resource::Resource;
use crate::parser::naming;

/// Write the selected resources to `output_dir`, creating it if needed.
///
/// `selected == None` writes every resource; otherwise only the listed
/// indices are written (out-of-range indices match nothing). Files are
/// written in resource order and an existing file is never replaced: a
/// `_1`, `_2`, … suffix is added before the extension instead.
///
/// Stops at the first failed write. Files written before the failure stay
/// on disk.
pub fn extract_resources(
    resources: &[Resource],
    output_dir: &Path,
    selected: Option<&[usize]>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| DecomposeError::extraction(output_dir, e))?;

    let mut written = Vec::new();
    for (index, resource) in resources.iter().enumerate() {
        if selected.is_some_and(|indices| !indices.contains(&index)) {
            continue;
        }

        let path = unique_path(&output_dir.join(safe_filename(&resource.filename)));
        std::fs::write(&path, resource.data())
            .map_err(|e| DecomposeError::extraction(&path, e))?;
        tracing::info!(index, path = %path.display(), size = resource.size(), "Extracted resource");
        written.push(path);
    }

    Ok(written)
}

/// Reduce a proposed name to a single path component inside the output directory.
///
/// Declared names are kept as-is apart from dropping any directory part;
/// names with nothing usable get a synthesized `resource_<token>.bin`.
fn safe_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    match last {
        "" | "." | ".." => naming::resource_name("application/octet-stream"),
        _ => last.to_string(),
    }
}

/// If `path` already exists, append a counter to make it unique.
fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path.parent().unwrap_or(Path::new("."));

    let mut counter = 1u64;
    loop {
        let candidate = if ext.is_empty() {
            parent.join(format!("{stem}_{counter}"))
        } else {
            parent.join(format!("{stem}_{counter}.{ext}"))
        };
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::resource::ResourceSource;

    fn res(name: &str, data: &[u8]) -> Resource {
        Resource::new("image/png", name, ResourceSource::Embedded, data.to_vec())
    }

    #[test]
    fn test_unique_path_counts_up() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("x.png");
        assert_eq!(unique_path(&base), base);

        std::fs::write(&base, b"0").unwrap();
        assert_eq!(unique_path(&base), tmp.path().join("x_1.png"));

        std::fs::write(tmp.path().join("x_1.png"), b"1").unwrap();
        assert_eq!(unique_path(&base), tmp.path().join("x_2.png"));
    }

    #[test]
    fn test_unique_path_without_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("LICENSE");
        std::fs::write(&base, b"").unwrap();
        assert_eq!(unique_path(&base), tmp.path().join("LICENSE_1"));
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("logo.png"), "logo.png");
        assert_eq!(safe_filename("../../etc/passwd"), "passwd");
        assert_eq!(safe_filename("img\\sub\\a.gif"), "a.gif");
        assert!(safe_filename("..").starts_with("resource_"));
        assert!(safe_filename("dir/").ends_with(".bin"));
    }

    #[test]
    fn test_extract_all_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested").join("out");
        let resources = [res("a.png", b"A"), res("b.png", b"B")];

        let written = extract_resources(&resources, &out, None).unwrap();
        assert_eq!(written, [out.join("a.png"), out.join("b.png")]);
        assert_eq!(std::fs::read(out.join("b.png")).unwrap(), b"B");
    }

    #[test]
    fn test_extract_follows_resource_order() {
        let tmp = tempfile::tempdir().unwrap();
        let resources = [res("a.png", b"A"), res("b.png", b"B"), res("c.png", b"C")];

        let written = extract_resources(&resources, tmp.path(), Some(&[2, 0, 17][..])).unwrap();
        assert_eq!(written, [tmp.path().join("a.png"), tmp.path().join("c.png")]);
    }

    #[test]
    fn test_extract_empty_selection_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let resources = [res("a.png", b"A")];
        let written = extract_resources(&resources, tmp.path(), Some(&[][..])).unwrap();
        assert!(written.is_empty());
        assert!(!tmp.path().join("a.png").exists());
    }

    #[test]
    fn test_same_name_twice_in_one_call() {
        let tmp = tempfile::tempdir().unwrap();
        let resources = [res("x.png", b"1"), res("x.png", b"2")];
        let written = extract_resources(&resources, tmp.path(), None).unwrap();
        assert_eq!(written, [tmp.path().join("x.png"), tmp.path().join("x_1.png")]);
        assert_eq!(std::fs::read(tmp.path().join("x_1.png")).unwrap(), b"2");
    }

    #[test]
    fn test_unwritable_output_dir_is_extraction_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        let result = extract_resources(&[res("a.png", b"A")], &blocker.join("out"), None);
        assert!(matches!(result, Err(DecomposeError::Extraction { .. })));
    }
}
