// src/reports/document.rs
//! Tabular report documents and their CSV/HTML renderings

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::{ClientError, ClientResult};
use crate::models::Record;

/// Cell text for a missing or null value.
pub const MISSING_VALUE: &str = "N/A";

/// A column addressed by its wire field name.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub field: &'static str,
}

impl Column {
    pub const fn new(header: &'static str, field: &'static str) -> Self {
        Self { header, field }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Section {
    pub fn new<S: Into<String>>(title: S, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    /// One row per record, one cell per column, read through [`Record::field`].
    pub fn from_records<R: Record>(title: &str, columns: &[Column], records: &[R]) -> Self {
        let headers: Vec<&str> = columns.iter().map(|c| c.header).collect();
        let mut section = Self::new(title, &headers);
        for record in records {
            section.push_row(columns.iter().map(|c| record.field(c.field)).collect());
        }
        section
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<RenderedSection>,
}

/// Renders non-empty sections in order.
///
/// Rows are padded or cut to the header width and missing cells become
/// [`MISSING_VALUE`].
pub fn render_tabular_document(title: &str, sections: Vec<Section>) -> TabularDocument {
    let sections = sections
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(|section| {
            let width = section.columns.len();
            let rows = section
                .rows
                .into_iter()
                .map(|row| {
                    let mut cells: Vec<String> = row
                        .into_iter()
                        .take(width)
                        .map(|cell| match cell {
                            Some(value) if !value.trim().is_empty() => value,
                            _ => MISSING_VALUE.to_string(),
                        })
                        .collect();
                    cells.resize(width, MISSING_VALUE.to_string());
                    cells
                })
                .collect();
            RenderedSection {
                title: section.title,
                header: section.columns,
                rows,
            }
        })
        .collect();

    TabularDocument {
        title: title.to_string(),
        generated_at: Utc::now(),
        sections,
    }
}

impl TabularDocument {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, title: &str) -> Option<&RenderedSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// UTF-8 CSV with a byte order mark, sections stacked one after another.
    pub fn to_csv(&self) -> ClientResult<Vec<u8>> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice("\u{FEFF}".as_bytes());

        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(buffer);
        writer.write_record([self.title.as_str()])?;
        writer.write_record([format!("Generated: {}", self.generated_at.to_rfc3339())])?;

        for section in &self.sections {
            writer.write_record([section.title.as_str()])?;
            writer.write_record(&section.header)?;
            for row in &section.rows {
                writer.write_record(row)?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| ClientError::Export(format!("Failed to flush CSV: {}", e)))
    }

    /// Standalone HTML page with one table per section.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        html.push_str(
            "<style>body{font-family:Arial,sans-serif;padding:20px}\
             table{width:100%;border-collapse:collapse;margin-bottom:20px}\
             th,td{border:1px solid #ddd;padding:8px;text-align:left}\
             th{background-color:#f2f2f2}</style>\n",
        );
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
        html.push_str(&format!(
            "<p>Generated {}</p>\n",
            self.generated_at.with_timezone(&Local).format("%d/%m/%Y %H:%M")
        ));

        for section in &self.sections {
            html.push_str(&format!("<h2>{}</h2>\n<table>\n<thead><tr>", escape_html(&section.title)));
            for column in &section.header {
                html.push_str(&format!("<th>{}</th>", escape_html(column)));
            }
            html.push_str("</tr></thead>\n<tbody>\n");
            for row in &section.rows {
                html.push_str("<tr>");
                for cell in row {
                    html.push_str(&format!("<td>{}</td>", escape_html(cell)));
                }
                html.push_str("</tr>\n");
            }
            html.push_str("</tbody>\n</table>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats backend dates as `dd/mm/yyyy` (plus time when present).
///
/// Values that parse as nothing known are returned unchanged.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).format("%d/%m/%Y %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TabularDocument {
        let users = vec![
            json!({ "usuario_id": 1, "nombre": "Ana", "email": "ana@usb.edu" }),
            json!({ "usuario_id": 2, "nombre": "Luis, Jr.", "email": null }),
        ];
        let columns = [
            Column::new("ID", "usuario_id"),
            Column::new("Nombre", "nombre"),
            Column::new("Email", "email"),
        ];
        render_tabular_document(
            "Panel Admin",
            vec![
                Section::from_records("Usuarios", &columns, &users),
                Section::new("Laboratorios", &["ID", "Nombre"]),
            ],
        )
    }

    #[test]
    fn test_empty_sections_are_omitted_and_nulls_render_as_na() {
        let doc = sample();
        assert_eq!(doc.sections.len(), 1);
        assert!(doc.section("Laboratorios").is_none());

        let users = doc.section("Usuarios").unwrap();
        assert_eq!(users.header, vec!["ID", "Nombre", "Email"]);
        assert_eq!(users.rows[1], vec!["2", "Luis, Jr.", "N/A"]);
    }

    #[test]
    fn test_rows_are_fitted_to_header_width() {
        let mut section = Section::new("Resumen", &["Categoría", "Cantidad"]);
        section.push_row(vec![Some("activo".to_string())]);
        section.push_row(vec![Some("devuelto".to_string()), Some("2".to_string()), Some("extra".to_string())]);
        let doc = render_tabular_document("R", vec![section]);
        assert_eq!(doc.sections[0].rows, vec![vec!["activo", "N/A"], vec!["devuelto", "2"]]);
    }

    #[test]
    fn test_csv_has_bom_and_quotes_fields() {
        let bytes = sample().to_csv().unwrap();
        assert!(bytes.starts_with("\u{FEFF}".as_bytes()));

        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("ID,Nombre,Email\n"));
        assert!(text.contains("2,\"Luis, Jr.\",N/A\n"));
        assert!(!text.contains("Laboratorios"));
    }

    #[test]
    fn test_html_escapes_cells() {
        let mut section = Section::new("Notas", &["Texto"]);
        section.push_row(vec![Some("<b>R&D</b>".to_string())]);
        let html = render_tabular_document("Reporte", vec![section]).to_html();
        assert!(html.contains("<td>&lt;b&gt;R&amp;D&lt;/b&gt;</td>"));
        assert!(html.contains("<h2>Notas</h2>"));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-03"), "03/05/2024");
        assert_eq!(format_date("2024-05-03T14:30:00Z"), "03/05/2024 14:30");
        assert_eq!(format_date("2024-05-03 08:15:00"), "03/05/2024 08:15");
        assert_eq!(format_date("mañana"), "mañana");
    }
}
