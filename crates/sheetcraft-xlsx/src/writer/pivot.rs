//! Pivot table and pivot cache definition parts
//!
//! No cache records are stored; the cache is flagged for refresh so the
//! spreadsheet application computes the aggregates when the file is opened.

use sheetcraft_core::{CellAddress, CellRange, CellValue, PivotTableSpec};

use super::{escape_xml, relationship, REL_PIVOT_CACHE};
use crate::engine::{PivotEntry, Worksheet};

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Col,
}

/// Distinct values of one source column, in first-seen order
fn shared_items(source: Option<&Worksheet>, spec: &PivotTableSpec, field: usize) -> Vec<CellValue> {
    let Some(sheet) = source else {
        return Vec::new();
    };
    let range = spec.source.range;
    let col = range.start.col + field as u16;
    let mut items: Vec<CellValue> = Vec::new();
    for row in range.start.row + 1..=range.end.row {
        let value = sheet.value(CellAddress::new(row, col));
        if !items.contains(&value) {
            items.push(value);
        }
    }
    items
}

fn axis_of(spec: &PivotTableSpec, headers: &[String], field: usize) -> Option<Axis> {
    let is = |names: &[String]| {
        names
            .iter()
            .any(|n| PivotTableSpec::field_index(headers, n) == Some(field))
    };
    if is(&spec.row_fields) {
        Some(Axis::Row)
    } else if is(&spec.column_fields) {
        Some(Axis::Col)
    } else {
        None
    }
}

fn field_name(headers: &[String], index: usize) -> String {
    match headers.get(index) {
        Some(h) if !h.trim().is_empty() => h.clone(),
        _ => format!("Column{}", index + 1),
    }
}

/// Rough extent of the rendered table; the application resizes it on refresh
fn location(entry: &PivotEntry, source: Option<&Worksheet>) -> CellRange {
    let spec = &entry.spec;
    let row_items = spec
        .row_fields
        .first()
        .and_then(|f| PivotTableSpec::field_index(&entry.headers, f))
        .map(|i| shared_items(source, spec, i).len())
        .unwrap_or(0);
    let height = 1 + row_items as u32 + 1;
    let width = spec.row_fields.len().max(1) as u16 + spec.value_fields.len().max(1) as u16;
    let start = spec.target_cell;
    CellRange::new(
        start,
        CellAddress::new(start.row + height - 1, start.col + width - 1),
    )
}

/// `xl/pivotTables/pivotTableN.xml`
pub(super) fn pivot_table_xml(entry: &PivotEntry, source: Option<&Worksheet>, cache_id: usize) -> String {
    let spec = &entry.spec;
    let headers = &entry.headers;
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<pivotTableDefinition xmlns="{}" name="{}" cacheId="{}" dataOnRows="0" dataCaption="Values" updatedVersion="3" minRefreshableVersion="3" useAutoFormatting="1" itemPrintTitles="1" createdVersion="3" indent="0" outline="1" outlineData="1">"#,
        SPREADSHEET_NS,
        escape_xml(&spec.name),
        cache_id
    );

    xml.push_str(&format!(
        "\n    <location ref=\"{}\" firstHeaderRow=\"1\" firstDataRow=\"1\" firstDataCol=\"1\"/>",
        location(entry, source)
    ));

    xml.push_str(&format!("\n    <pivotFields count=\"{}\">", headers.len()));
    for i in 0..headers.len() {
        let is_data = spec
            .value_fields
            .iter()
            .any(|v| PivotTableSpec::field_index(headers, &v.field) == Some(i));
        let data_attr = if is_data { " dataField=\"1\"" } else { "" };
        match axis_of(spec, headers, i) {
            Some(axis) => {
                let axis_name = match axis {
                    Axis::Row => "axisRow",
                    Axis::Col => "axisCol",
                };
                let count = shared_items(source, spec, i).len();
                xml.push_str(&format!(
                    "\n        <pivotField axis=\"{}\"{} showAll=\"0\"><items count=\"{}\">",
                    axis_name,
                    data_attr,
                    count + 1
                ));
                for x in 0..count {
                    xml.push_str(&format!("<item x=\"{}\"/>", x));
                }
                xml.push_str("<item t=\"default\"/></items></pivotField>");
            }
            None => xml.push_str(&format!(
                "\n        <pivotField{} showAll=\"0\"/>",
                data_attr
            )),
        }
    }
    xml.push_str("\n    </pivotFields>");

    let indexes = |names: &[String]| -> Vec<usize> {
        names
            .iter()
            .filter_map(|n| PivotTableSpec::field_index(headers, n))
            .collect()
    };

    let rows = indexes(&spec.row_fields);
    if !rows.is_empty() {
        xml.push_str(&format!("\n    <rowFields count=\"{}\">", rows.len()));
        for x in rows {
            xml.push_str(&format!("<field x=\"{}\"/>", x));
        }
        xml.push_str("</rowFields>");
    }

    // Several value fields are laid out as an extra column field (x = -2)
    let mut cols: Vec<i64> = indexes(&spec.column_fields)
        .into_iter()
        .map(|x| x as i64)
        .collect();
    if spec.value_fields.len() > 1 {
        cols.push(-2);
    }
    if !cols.is_empty() {
        xml.push_str(&format!("\n    <colFields count=\"{}\">", cols.len()));
        for x in cols {
            xml.push_str(&format!("<field x=\"{}\"/>", x));
        }
        xml.push_str("</colFields>");
    }

    let data: Vec<(usize, &sheetcraft_core::PivotValueField)> = spec
        .value_fields
        .iter()
        .filter_map(|v| PivotTableSpec::field_index(headers, &v.field).map(|i| (i, v)))
        .collect();
    if !data.is_empty() {
        xml.push_str(&format!("\n    <dataFields count=\"{}\">", data.len()));
        for (fld, value) in data {
            xml.push_str(&format!(
                "<dataField name=\"{}\" fld=\"{}\" subtotal=\"{}\" baseField=\"0\" baseItem=\"0\"/>",
                escape_xml(&value.caption()),
                fld,
                value.aggregation.xml_name()
            ));
        }
        xml.push_str("</dataFields>");
    }

    xml.push_str(
        "\n    <pivotTableStyleInfo name=\"PivotStyleLight16\" showRowHeaders=\"1\" showColHeaders=\"1\" showRowStripes=\"0\" showColStripes=\"0\" showLastColumn=\"1\"/>",
    );
    xml.push_str("\n</pivotTableDefinition>");
    xml
}

/// Relationship from a pivot table to its cache definition
pub(super) fn pivot_table_rels_xml(number: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}
</Relationships>"#,
        relationship(
            1,
            REL_PIVOT_CACHE,
            &format!("../pivotCache/pivotCacheDefinition{}.xml", number)
        )
    )
}

/// `xl/pivotCache/pivotCacheDefinitionN.xml`
pub(super) fn cache_definition_xml(entry: &PivotEntry, source: Option<&Worksheet>) -> String {
    let spec = &entry.spec;
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<pivotCacheDefinition xmlns="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" saveData="0" refreshOnLoad="1" createdVersion="3" refreshedVersion="3" minRefreshableVersion="3" recordCount="0">
    <cacheSource type="worksheet"><worksheetSource ref="{}" sheet="{}"/></cacheSource>"#,
        SPREADSHEET_NS,
        spec.source.range,
        escape_xml(&spec.source.sheet)
    );

    xml.push_str(&format!(
        "\n    <cacheFields count=\"{}\">",
        entry.headers.len()
    ));
    for i in 0..entry.headers.len() {
        let name = escape_xml(&field_name(&entry.headers, i));
        if axis_of(spec, &entry.headers, i).is_none() {
            xml.push_str(&format!(
                "\n        <cacheField name=\"{}\" numFmtId=\"0\"><sharedItems/></cacheField>",
                name
            ));
            continue;
        }

        let items = shared_items(source, spec, i);
        let all_numbers = items.iter().all(|v| matches!(v, CellValue::Number(_)));
        let type_attrs = if all_numbers && !items.is_empty() {
            " containsSemiMixedTypes=\"0\" containsString=\"0\" containsNumber=\"1\""
        } else {
            ""
        };
        xml.push_str(&format!(
            "\n        <cacheField name=\"{}\" numFmtId=\"0\"><sharedItems{} count=\"{}\">",
            name,
            type_attrs,
            items.len()
        ));
        for item in &items {
            xml.push_str(&shared_item_xml(item));
        }
        xml.push_str("</sharedItems></cacheField>");
    }
    xml.push_str("\n    </cacheFields>\n</pivotCacheDefinition>");
    xml
}

fn shared_item_xml(value: &CellValue) -> String {
    match value {
        CellValue::Empty => "<m/>".to_string(),
        CellValue::Number(n) => format!("<n v=\"{}\"/>", n),
        CellValue::Boolean(b) => format!("<b v=\"{}\"/>", if *b { 1 } else { 0 }),
        other => format!("<s v=\"{}\"/>", escape_xml(&other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XlsxEngine;
    use sheetcraft_core::{Aggregation, PivotValueField, SheetRange, SpreadsheetEngine};

    fn engine() -> XlsxEngine {
        let mut engine = XlsxEngine::new();
        engine.create_sheet("Data").unwrap();
        engine.create_sheet("Pivot").unwrap();
        let rows = [
            ["Region", "Month", "Revenue"],
            ["North", "Jan", "10"],
            ["South", "Jan", "20"],
            ["North", "Feb", "30"],
        ];
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                let value = match text.parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::from(*text),
                };
                engine
                    .set_cell_value("Data", CellAddress::new(r as u32, c as u16), value)
                    .unwrap();
            }
        }
        engine
            .add_pivot_table(&PivotTableSpec {
                name: "RevenueByRegion".into(),
                source: SheetRange::parse("Data!A1:C4").unwrap(),
                target_sheet: "Pivot".into(),
                target_cell: CellAddress::parse("A3").unwrap(),
                row_fields: vec!["Region".into()],
                column_fields: vec!["Month".into()],
                value_fields: vec![PivotValueField::new("Revenue", Aggregation::Sum)],
            })
            .unwrap();
        engine
    }

    #[test]
    fn test_pivot_table_definition() {
        let engine = engine();
        let entry = &engine.pivot_tables()[0];
        let xml = pivot_table_xml(entry, engine.worksheet("Data"), 1);
        assert!(xml.contains("name=\"RevenueByRegion\" cacheId=\"1\""));
        assert!(xml.contains("<pivotField axis=\"axisRow\" showAll=\"0\"><items count=\"3\">"));
        assert!(xml.contains("<rowFields count=\"1\"><field x=\"0\"/></rowFields>"));
        assert!(xml.contains("<colFields count=\"1\"><field x=\"1\"/></colFields>"));
        assert!(xml.contains(
            "<dataField name=\"Sum of Revenue\" fld=\"2\" subtotal=\"sum\" baseField=\"0\" baseItem=\"0\"/>"
        ));
        assert!(xml.contains("<location ref=\"A3:B6\""));
    }

    #[test]
    fn test_cache_definition() {
        let engine = engine();
        let entry = &engine.pivot_tables()[0];
        let xml = cache_definition_xml(entry, engine.worksheet("Data"));
        assert!(xml.contains("<worksheetSource ref=\"A1:C4\" sheet=\"Data\"/>"));
        assert!(xml.contains("<sharedItems count=\"2\"><s v=\"North\"/><s v=\"South\"/></sharedItems>"));
        assert!(xml.contains("<cacheField name=\"Revenue\" numFmtId=\"0\"><sharedItems/></cacheField>"));
    }
}
