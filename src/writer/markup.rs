use std::fmt::Write as _;

use super::DocumentWriter;
use crate::document::Document;
use crate::error::PortationResult;
use crate::types::Value;

/// Renders every sheet as an HTML table
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlWriter;

impl DocumentWriter for HtmlWriter {
    fn write(&self, document: &Document) -> PortationResult<Vec<u8>> {
        let props = document.properties();
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", escape(&props.title));
        if !props.creator.is_empty() {
            let _ = writeln!(out, "<meta name=\"author\" content=\"{}\">", escape(&props.creator));
        }
        if !props.keywords.is_empty() {
            let _ = writeln!(out, "<meta name=\"keywords\" content=\"{}\">", escape(&props.keywords));
        }
        out.push_str("</head>\n<body>\n");

        for sheet in document.sheets() {
            let _ = writeln!(out, "<table data-sheet=\"{}\">", escape(sheet.title()));
            for row in sheet.rows() {
                out.push_str("<tr>");
                for value in &row {
                    let _ = write!(out, "<td>{}</td>", escape(&value.to_string()));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</table>\n");
        }

        out.push_str("</body>\n</html>\n");
        Ok(out.into_bytes())
    }
}

/// SpreadsheetML 2003 (`.xml`) writer
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlWriter;

impl DocumentWriter for XmlWriter {
    fn write(&self, document: &Document) -> PortationResult<Vec<u8>> {
        let props = document.properties();
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<?mso-application progid=\"Excel.Sheet\"?>\n");
        out.push_str(
            "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\" \
             xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
        );

        out.push_str("<DocumentProperties xmlns=\"urn:schemas-microsoft-com:office:office\">\n");
        for (tag, text) in [
            ("Title", &props.title),
            ("Subject", &props.subject),
            ("Author", &props.creator),
            ("LastAuthor", &props.last_modified_by),
            ("Description", &props.description),
            ("Keywords", &props.keywords),
            ("Category", &props.category),
            ("Company", &props.company),
        ] {
            if !text.is_empty() {
                let _ = writeln!(out, "<{tag}>{}</{tag}>", escape(text));
            }
        }
        out.push_str("</DocumentProperties>\n");

        for sheet in document.sheets() {
            let _ = writeln!(out, "<Worksheet ss:Name=\"{}\">\n<Table>", escape(sheet.title()));
            for row in sheet.rows() {
                out.push_str("<Row>");
                for value in &row {
                    match value {
                        Value::Null => out.push_str("<Cell/>"),
                        Value::Int(_) | Value::Float(_) => {
                            let _ = write!(out, "<Cell><Data ss:Type=\"Number\">{}</Data></Cell>", value);
                        }
                        Value::Bool(b) => {
                            let _ = write!(
                                out,
                                "<Cell><Data ss:Type=\"Boolean\">{}</Data></Cell>",
                                u8::from(*b)
                            );
                        }
                        other => {
                            let _ = write!(
                                out,
                                "<Cell><Data ss:Type=\"String\">{}</Data></Cell>",
                                escape(&other.to_string())
                            );
                        }
                    }
                }
                out.push_str("</Row>\n");
            }
            out.push_str("</Table>\n</Worksheet>\n");
        }

        out.push_str("</Workbook>\n");
        Ok(out.into_bytes())
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Sheet;

    fn sample() -> Document {
        let mut sheet = Sheet::new("R&D");
        sheet.set_cell_value("A1", "<b>Nom</b>").unwrap();
        sheet.set_cell_value("B1", 54).unwrap();
        let mut document = Document::from_sheet(sheet);
        document.properties_mut().set_title("People");
        document
    }

    #[test]
    fn test_html_escapes_cells() {
        let html = String::from_utf8(HtmlWriter.write(&sample()).unwrap()).unwrap();
        assert!(html.contains("<title>People</title>"));
        assert!(html.contains("<table data-sheet=\"R&amp;D\">"));
        assert!(html.contains("<td>&lt;b&gt;Nom&lt;/b&gt;</td><td>54</td>"));
    }

    #[test]
    fn test_spreadsheet_ml_types() {
        let xml = String::from_utf8(XmlWriter.write(&sample()).unwrap()).unwrap();
        assert!(xml.contains("<Worksheet ss:Name=\"R&amp;D\">"));
        assert!(xml.contains("<Data ss:Type=\"Number\">54</Data>"));
        assert!(xml.contains("<Title>People</Title>"));
    }
}
