//! Spreadsheet fixture writer
//!
//! Builds a minimal workbook: every non-empty cell is a shared string, rows are
//! numbered from 1 and the first row is the header.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = String::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    name
}

/// Write `rows` (header first) as `xl/worksheets/sheet1.xml` of a new workbook
pub fn write_workbook(path: &Path, rows: &[Vec<&str>]) {
    let mut shared: Vec<String> = Vec::new();
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    for (r, row) in rows.iter().enumerate() {
        let row_number = r + 1;
        sheet.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let index = shared.len();
            shared.push(escape(value));
            sheet.push_str(&format!(
                r#"<c r="{}{}" t="s"><v>{}</v></c>"#,
                column_name(c),
                row_number,
                index
            ));
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let mut strings = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        shared.len()
    );
    for text in &shared {
        strings.push_str(&format!("<si><t>{}</t></si>", text));
    }
    strings.push_str("</sst>");

    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("xl/sharedStrings.xml", strings),
        ("xl/worksheets/sheet1.xml", sheet),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
