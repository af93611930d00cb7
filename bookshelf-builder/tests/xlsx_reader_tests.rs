//! Spreadsheet reading against generated workbooks

mod helpers;

use bookshelf_builder::services::record_normalizer::RecordNormalizer;
use bookshelf_builder::services::XlsxReader;
use helpers::write_workbook;
use tempfile::TempDir;

#[test]
fn test_rows_become_header_keyed_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("My Library.xlsx");
    write_workbook(
        &path,
        &[
            vec!["Title", "Author", "ISBN", "Published"],
            vec!["Dune", "Frank Herbert", "978-0-441-17271-9", "1965"],
            vec!["Emma", "", "", "December 1815"],
        ],
    );

    let records = XlsxReader::new(&path).read();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Title"], "Dune");
    assert_eq!(records[0]["ISBN"], "978-0-441-17271-9");
    // Header without data in this row is still present
    assert_eq!(records[1]["Author"], "");
    assert_eq!(records[1]["Published"], "December 1815");
}

#[test]
fn test_empty_and_untitled_rows_are_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("books.xlsx");
    write_workbook(
        &path,
        &[
            vec!["Title", "Author"],
            vec!["", ""],
            vec!["", "Anonymous"],
            vec!["Beowulf", ""],
        ],
    );

    let records = XlsxReader::new(&path).read();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Title"], "Beowulf");
}

#[test]
fn test_missing_or_corrupt_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    assert!(XlsxReader::new(dir.path().join("absent.xlsx")).read().is_empty());

    let corrupt = dir.path().join("corrupt.xlsx");
    std::fs::write(&corrupt, b"not a zip archive").unwrap();
    assert!(XlsxReader::new(&corrupt).read().is_empty());
}

#[test]
fn test_rereading_unchanged_workbook_yields_same_ids() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("My Library.xlsx");
    write_workbook(
        &path,
        &[
            vec!["Title", "Author", "ISBN"],
            vec!["Dune", "Frank Herbert", "978-0-441-17271-9"],
            vec!["Emma", "Jane Austen", ""],
            vec!["Emma", "Jane Austen", ""],
        ],
    );

    let normalizer = RecordNormalizer::new();
    let first = normalizer.normalize_all(&XlsxReader::new(&path).read());
    let second = normalizer.normalize_all(&XlsxReader::new(&path).read());

    let ids: Vec<_> = first.books().iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids, vec!["978-0-441-17271-9", "emma-jane-austen", "emma-jane-austen-2"]);
    assert_eq!(first, second);
}
