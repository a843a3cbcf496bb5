use osync_fs::{FileFilter, scan_dir};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn md_filter() -> FileFilter {
    FileFilter::new(&[".md".to_string()], &[".*".to_string(), "*.tmp".to_string()]).unwrap()
}

#[test]
fn test_scan_missing_root_is_empty() {
    let temp = TempDir::new().unwrap();
    let entries = scan_dir(&temp.path().join("missing"), &md_filter()).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn test_scan_recurses_and_filters() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("daily")).unwrap();
    fs::create_dir_all(root.join(".obsidian")).unwrap();
    fs::write(root.join("hub.md"), "hub").unwrap();
    fs::write(root.join("daily/2024-01-01.md"), "day").unwrap();
    fs::write(root.join("daily/scratch.tmp"), "tmp").unwrap();
    fs::write(root.join(".obsidian/app.md"), "hidden").unwrap();
    fs::write(root.join("image.png"), "png").unwrap();

    let entries = scan_dir(root, &md_filter()).unwrap();
    let paths: Vec<_> = entries.iter().map(|e| e.relative_path.as_str()).collect();

    assert_eq!(paths, vec!["daily/2024-01-01.md", "hub.md"]);
}

#[test]
fn test_scan_reports_size() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.md"), "12345").unwrap();

    let entries = scan_dir(temp.path(), &md_filter()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].size, 5);
}
