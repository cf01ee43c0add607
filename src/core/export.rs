use crate::core::grade::{parse_score, round_2_decimals};
use crate::core::Exporter;
use crate::domain::model::{MissingScorePolicy, PeriodScores, StudentGrade};
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::{Cursor, Read, Write};
use zip::write::{FileOptions, ZipWriter};

const HEADERS: [&str; 5] = ["Student", "Prelim", "Midterm", "Final", "Average"];

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// CSV 列：student,prelim,midterm,final
#[derive(Debug, Deserialize)]
struct GradeRow {
    student: String,
    #[serde(default)]
    prelim: String,
    #[serde(default)]
    midterm: String,
    #[serde(default, rename = "final")]
    finals: String,
}

#[derive(Debug, Clone, Default)]
pub struct GradeSheet {
    pub title: String,
    pub rows: Vec<StudentGrade>,
}

impl GradeSheet {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, student: impl Into<String>, scores: PeriodScores) {
        self.rows.push(StudentGrade {
            student: student.into(),
            scores,
        });
    }

    pub fn from_csv_reader<R: Read>(title: impl Into<String>, reader: R) -> Result<Self> {
        let mut sheet = Self::new(title);
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        for row in csv_reader.deserialize() {
            let row: GradeRow = row?;
            let scores = PeriodScores::new(
                parse_score(&row.prelim),
                parse_score(&row.midterm),
                parse_score(&row.finals),
            );
            sheet.push(row.student, scores);
        }

        tracing::debug!("Loaded {} grade rows", sheet.rows.len());
        Ok(sheet)
    }
}

pub struct GradeSheetExporter {
    sheet: GradeSheet,
    policy: MissingScorePolicy,
}

impl GradeSheetExporter {
    pub fn new(sheet: GradeSheet, policy: MissingScorePolicy) -> Self {
        Self { sheet, policy }
    }

    pub fn sheet(&self) -> &GradeSheet {
        &self.sheet
    }

    fn workbook_xml(&self) -> String {
        let name = sheet_name(&self.sheet.title);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            xml_escape(&name)
        )
    }

    fn worksheet_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );

        xml.push_str(r#"<row r="1">"#);
        for (col, header) in HEADERS.iter().enumerate() {
            xml.push_str(&string_cell(col, 1, header));
        }
        xml.push_str("</row>");

        for (index, grade) in self.sheet.rows.iter().enumerate() {
            let row = index + 2;
            xml.push_str(&format!(r#"<row r="{}">"#, row));
            xml.push_str(&string_cell(0, row, &grade.student));

            let scores = [grade.scores.prelim, grade.scores.midterm, grade.scores.finals];
            for (offset, score) in scores.iter().enumerate() {
                if let Some(v) = score.value() {
                    xml.push_str(&number_cell(offset + 1, row, v));
                }
            }

            let average = grade.scores.average(self.policy);
            if !average.is_complete() {
                tracing::debug!("Row {} ({}) is missing {:?}", row, grade.student, average.missing);
            }
            if let Some(avg) = average.value {
                xml.push_str(&number_cell(4, row, round_2_decimals(avg)));
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", ROOT_RELS_XML.to_string()),
            ("xl/workbook.xml", self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
            ("xl/worksheets/sheet1.xml", self.worksheet_xml()),
        ];

        for (name, content) in parts {
            zip.start_file::<_, ()>(name, FileOptions::default())?;
            zip.write_all(content.as_bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait]
impl Exporter for GradeSheetExporter {
    async fn export(&self) -> Result<Vec<u8>> {
        if self.sheet.rows.is_empty() {
            return Err(ClientError::ExportError {
                message: format!("grade sheet '{}' has no rows", self.sheet.title),
            });
        }

        let bytes = self.to_xlsx().map_err(|e| ClientError::ExportError {
            message: format!("could not write xlsx: {}", e),
        })?;
        tracing::info!(
            "📄 Exported {} rows to xlsx ({} bytes)",
            self.sheet.rows.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// 0 → A, 25 → Z, 26 → AA
fn column_name(mut col: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn string_cell(col: usize, row: usize, value: &str) -> String {
    format!(
        r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        column_name(col),
        row,
        xml_escape(value)
    )
}

/// 非有限值不能寫進 `<v>`，改成文字儲存格
fn number_cell(col: usize, row: usize, value: f64) -> String {
    match non_finite_label(value) {
        Some(label) => string_cell(col, row, label),
        None => format!(r#"<c r="{}{}"><v>{}</v></c>"#, column_name(col), row, value),
    }
}

fn non_finite_label(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("INF")
    } else if value == f64::NEG_INFINITY {
        Some("-INF")
    } else {
        None
    }
}

fn sheet_name(title: &str) -> String {
    // Excel 工作表名稱限制 31 字元且不能含特殊符號
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, ':' | '\\' | '/' | '?' | '*' | '[' | ']'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Grades".to_string()
    } else {
        cleaned
    }
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
