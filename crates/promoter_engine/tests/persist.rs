use std::fs;

use pretty_assertions::assert_eq;
use promoter_engine::{ensure_output_dir, load_ledger, read_rows, LedgerRow, LedgerWriter};
use tempfile::TempDir;

fn row(promotion: &str, url: &str) -> LedgerRow {
    LedgerRow {
        promotion: promotion.to_string(),
        url: url.to_string(),
    }
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn file_in_place_of_output_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    assert!(ensure_output_dir(&file_path).is_err());
}

#[test]
fn missing_ledger_has_no_rows() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("promotions_none.csv");
    assert!(read_rows(&path).unwrap().is_empty());
    assert!(load_ledger(&path).unwrap().is_empty());
}

#[test]
fn header_is_written_once_and_every_field_is_quoted() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("promotions_week.csv");

    let mut writer = LedgerWriter::open(&path).unwrap();
    writer.append("First read", "https://a.example/post").unwrap();
    drop(writer);
    let mut writer = LedgerWriter::open(&path).unwrap();
    writer.append("Second read", "https://b.example").unwrap();
    drop(writer);

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "\"Promotion\",\"URL\"\n\
         \"First read\",\"https://a.example/post\"\n\
         \"Second read\",\"https://b.example\"\n"
    );
}

#[test]
fn rows_read_back_with_commas_and_backslashes_intact() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("promotions_odd.csv");

    let mut writer = LedgerWriter::open(&path).unwrap();
    writer.append("Fast, small, and sharp", "https://a.example/x?a=1,2").unwrap();
    writer.append("Paths like C:\\temp", "https://b.example/a\\b").unwrap();
    drop(writer);

    assert_eq!(
        read_rows(&path).unwrap(),
        vec![
            row("Fast, small, and sharp", "https://a.example/x?a=1,2"),
            row("Paths like C:\\temp", "https://b.example/a\\b"),
        ]
    );
}

#[test]
fn ledger_keys_come_from_the_url_column() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("promotions_keys.csv");
    fs::write(
        &path,
        "\"Promotion\",\"URL\"\n\
         \"One\",\"http://www.a.example/post/\"\n\
         \"short row\"\n\
         \"Two\",\"https://b.example?utm_source=feed\"\n",
    )
    .unwrap();

    let ledger = load_ledger(&path).unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(ledger.contains_key("https://a.example/post"));
    assert!(ledger.contains_key("https://b.example"));
}

#[test]
fn directory_in_place_of_ledger_fails_to_open() {
    let temp = TempDir::new().unwrap();
    assert!(LedgerWriter::open(temp.path()).is_err());
}
