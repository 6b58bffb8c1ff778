//! XLSX reader
//!
//! Reopens a package into an [`XlsxEngine`]: sheet order, the active sheet,
//! cell values and styles, merged ranges, column widths, row heights and
//! frozen panes. Charts, pivot tables and validations are not read back.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use sheetcraft_core::{CellAddress, CellRange, CellValue, StyleConfig, StyleId};

use crate::engine::{Worksheet, XlsxEngine};
use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;

/// Widest column span expanded from a single `<col>` element
const MAX_COL_SPAN: u16 = 1024;

/// Decode `_xHHHH_` escapes used for control characters in strings
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.get(6..7) == Some("_"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Inverse of [`CellValue::to_serial`]
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let serial = if serial < 60.0 { serial + 1.0 } else { serial };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn parse_attr<T: std::str::FromStr>(e: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    attr_value(e, key).and_then(|v| v.parse().ok())
}

/// Cell being assembled while its children are read
#[derive(Debug, Default)]
struct PendingCell {
    reference: String,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<XlsxEngine> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<XlsxEngine> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;
        let (sheet_info, active_tab) = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut sheets = Vec::with_capacity(sheet_info.len());
        for (name, r_id) in &sheet_info {
            let path = sheet_paths.get(r_id).ok_or_else(|| {
                XlsxError::MissingPart(format!("relationship {} for sheet '{}'", r_id, name))
            })?;
            let mut sheet = Worksheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut sheet, &shared_strings, &styles)?;
            sheets.push(sheet);
        }

        log::debug!(
            "read {} sheets and {} styles",
            sheets.len(),
            styles.len()
        );
        Ok(XlsxEngine::from_parts(sheets, styles, active_tab))
    }

    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"t" if in_si => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        in_si = false;
                    }
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => current.push_str(&e.unescape()?),
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<StyleConfig>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(vec![StyleConfig::default()]),
        }
    }

    /// Sheet names with their relationship ids, and the active tab
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<(Vec<(String, String)>, usize)> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut active_tab = 0;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        if let (Some(name), Some(r_id)) =
                            (attr_value(&e, b"name"), attr_value(&e, b"r:id"))
                        {
                            sheets.push((name, r_id));
                        }
                    }
                    b"workbookView" => {
                        active_tab = parse_attr(&e, b"activeTab").unwrap_or(0);
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, active_tab))
    }

    /// Worksheet part paths keyed by relationship id
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        sheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[StyleConfig],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => Self::read_row_attrs(&e, sheet),
                    b"c" => cell = Some(Self::start_cell(&e)),
                    b"v" => in_value = true,
                    b"f" => in_formula = true,
                    b"t" if cell.is_some() => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => Self::read_row_attrs(&e, sheet),
                    b"c" => {
                        let pending = Self::start_cell(&e);
                        Self::finish_cell(pending, sheet, shared_strings, styles)?;
                    }
                    b"col" => Self::read_col(&e, sheet),
                    b"pane" => Self::read_pane(&e, sheet),
                    b"mergeCell" => {
                        if let Some(reference) = attr_value(&e, b"ref") {
                            sheet.push_merge(CellRange::parse(&reference)?);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(pending) = cell.as_mut() {
                        let text = e.unescape()?;
                        let target = if in_value {
                            Some(&mut pending.value)
                        } else if in_formula {
                            Some(&mut pending.formula)
                        } else if in_inline_text {
                            Some(&mut pending.value)
                        } else {
                            None
                        };
                        if let Some(slot) = target {
                            slot.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            Self::finish_cell(pending, sheet, shared_strings, styles)?;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn read_row_attrs(e: &BytesStart<'_>, sheet: &mut Worksheet) {
        let row: Option<u32> = parse_attr(e, b"r");
        let height: Option<f64> = parse_attr(e, b"ht");
        let custom = attr_value(e, b"customHeight").map_or(false, |v| v == "1" || v == "true");
        if let (Some(row), Some(height), true) = (row, height, custom) {
            if row > 0 {
                sheet.insert_row_height(row - 1, height);
            }
        }
    }

    fn read_col(e: &BytesStart<'_>, sheet: &mut Worksheet) {
        let min: Option<u16> = parse_attr(e, b"min");
        let max: Option<u16> = parse_attr(e, b"max");
        let width: Option<f64> = parse_attr(e, b"width");
        if let (Some(min), Some(max), Some(width)) = (min, max, width) {
            if min == 0 || max < min || max - min >= MAX_COL_SPAN {
                return;
            }
            for col in min..=max {
                sheet.insert_column_width(col - 1, width);
            }
        }
    }

    fn read_pane(e: &BytesStart<'_>, sheet: &mut Worksheet) {
        let frozen = attr_value(e, b"state").map_or(false, |s| s == "frozen" || s == "frozenSplit");
        if !frozen {
            return;
        }
        let x: u16 = parse_attr::<f64>(e, b"xSplit").unwrap_or(0.0) as u16;
        let y: u32 = parse_attr::<f64>(e, b"ySplit").unwrap_or(0.0) as u32;
        if x > 0 || y > 0 {
            sheet.set_freeze(Some(CellAddress::new(y, x)));
        }
    }

    fn start_cell(e: &BytesStart<'_>) -> PendingCell {
        PendingCell {
            reference: attr_value(e, b"r").unwrap_or_default(),
            cell_type: attr_value(e, b"t"),
            style: parse_attr(e, b"s"),
            value: None,
            formula: None,
        }
    }

    fn finish_cell(
        pending: PendingCell,
        sheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[StyleConfig],
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(&pending.reference)?;
        let style = pending
            .style
            .filter(|&s| s != 0 && (s as usize) < styles.len());

        let value = match (pending.formula, pending.cell_type.as_deref()) {
            (Some(formula), _) => CellValue::formula(formula),
            (None, Some("s")) => {
                let index: usize = pending
                    .value
                    .as_deref()
                    .and_then(|v| v.trim().parse().ok())
                    .ok_or_else(|| XlsxError::Parse(format!("bad shared string in {}", addr)))?;
                let text = shared_strings.get(index).ok_or_else(|| {
                    XlsxError::Parse(format!("shared string {} out of range", index))
                })?;
                CellValue::String(text.clone())
            }
            (None, Some("inlineStr")) | (None, Some("str")) | (None, Some("e")) => {
                CellValue::String(pending.value.unwrap_or_default())
            }
            (None, Some("b")) => CellValue::Boolean(pending.value.as_deref() == Some("1")),
            (None, _) => match pending.value.as_deref().map(str::trim) {
                None | Some("") => CellValue::Empty,
                Some(raw) => {
                    let n: f64 = raw
                        .parse()
                        .map_err(|_| XlsxError::Parse(format!("bad number '{}' in {}", raw, addr)))?;
                    let is_date = style
                        .and_then(|s| styles.get(s as usize))
                        .map_or(false, |s| s.format().is_date_format());
                    match (is_date, serial_to_datetime(n)) {
                        (true, Some(dt)) => CellValue::DateTime(dt),
                        _ => CellValue::Number(n),
                    }
                }
            },
        };

        if let Some(style) = style {
            sheet.cell_mut(addr).style = Some(StyleId(style));
        }
        sheet.set_value(addr, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("a_x000a_b"), "a\nb");
        assert_eq!(decode_excel_escapes("plain_text"), "plain_text");
        assert_eq!(decode_excel_escapes("_x12_"), "_x12_");
    }

    #[test]
    fn test_serial_roundtrip() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let serial = CellValue::to_serial(&dt);
        assert_eq!(serial, 45366.5);
        assert_eq!(serial_to_datetime(serial), Some(dt));
    }
}
