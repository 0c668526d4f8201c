use chrono::{Local, TimeZone};
use tempfile::TempDir;
use textsnip::export::{export_image, export_text, image_file_name, text_file_name};

#[test]
fn test_image_file_name_format() {
    let now = Local.with_ymd_and_hms(2024, 3, 15, 10, 30, 45).unwrap();
    assert_eq!(image_file_name(now), "snip-2024-03-15-10-30-45");
}

#[test]
fn test_text_file_name_uses_millis() {
    let now = Local.with_ymd_and_hms(2024, 3, 15, 10, 30, 45).unwrap();
    assert_eq!(
        text_file_name(now),
        format!("extracted_text_{}", now.timestamp_millis())
    );
}

#[test]
fn test_export_text_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = export_text(dir.path(), "hello world").unwrap();

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("extracted_text_"));
    assert!(name.ends_with(".txt"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello world");
}

#[test]
fn test_export_never_overwrites() {
    let dir = TempDir::new().unwrap();
    let first = export_image(dir.path(), b"first").unwrap();
    let second = export_image(dir.path(), b"second").unwrap();
    let third = export_image(dir.path(), b"third").unwrap();

    assert_ne!(first, second);
    assert_ne!(second, third);
    assert_eq!(std::fs::read(&first).unwrap(), b"first");
    assert_eq!(std::fs::read(&second).unwrap(), b"second");
    assert_eq!(std::fs::read(&third).unwrap(), b"third");
}

#[test]
fn test_export_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let path = export_text(&nested, "x").unwrap();
    assert!(path.starts_with(&nested));
    assert!(path.exists());
}
