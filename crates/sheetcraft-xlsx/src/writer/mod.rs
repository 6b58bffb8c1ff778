//! XLSX writer
//!
//! Parts are written in a fixed order with a fixed timestamp, so the same
//! engine state always produces the same bytes.

mod chart;
mod pivot;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use sheetcraft_core::{CellAddress, CellValue, DataValidation};
use zip::write::SimpleFileOptions;

use crate::engine::{Cell, Worksheet, XlsxEngine};
use crate::error::XlsxResult;
use crate::options::SaveOptions;
use crate::styles::XlsxStyleTable;

const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_DRAWING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";
const REL_CHART: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
const REL_PIVOT_TABLE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/pivotTable";
const REL_PIVOT_CACHE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/pivotCacheDefinition";

/// Part numbering shared by every writer step
#[derive(Debug, Default)]
struct PackageLayout {
    /// Drawing number per sheet, for sheets that carry charts
    drawings: Vec<Option<usize>>,
    /// Chart numbers per sheet
    charts: Vec<Vec<usize>>,
    /// Pivot numbers per sheet (the sheet the table is rendered on)
    pivots: Vec<Vec<usize>>,
    pivot_count: usize,
}

impl PackageLayout {
    fn plan(engine: &XlsxEngine) -> Self {
        let mut layout = PackageLayout::default();
        let mut next_drawing = 1;
        let mut next_chart = 1;
        for sheet in engine.worksheets() {
            let count = sheet.charts().len();
            if count == 0 {
                layout.drawings.push(None);
                layout.charts.push(Vec::new());
            } else {
                layout.drawings.push(Some(next_drawing));
                layout.charts.push((next_chart..next_chart + count).collect());
                next_drawing += 1;
                next_chart += count;
            }
            layout.pivots.push(Vec::new());
        }

        let names = engine.sheet_names();
        for (i, entry) in engine.pivot_tables().iter().enumerate() {
            if let Some(sheet) = names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(&entry.spec.target_sheet))
            {
                layout.pivots[sheet].push(i + 1);
            }
        }
        layout.pivot_count = engine.pivot_tables().len();
        layout
    }

    fn sheet_has_rels(&self, index: usize) -> bool {
        self.drawings[index].is_some() || !self.pivots[index].is_empty()
    }
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(
        engine: &XlsxEngine,
        path: P,
        options: &SaveOptions,
    ) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(engine, BufWriter::new(file), options)
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(
        engine: &XlsxEngine,
        writer: W,
        options: &SaveOptions,
    ) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let layout = PackageLayout::plan(engine);
        let style_table = XlsxStyleTable::build(engine.styles());

        let mut part = |name: String, content: String| -> XlsxResult<()> {
            zip.start_file(name, Self::file_options(options))?;
            zip.write_all(content.as_bytes())?;
            Ok(())
        };

        part(
            "[Content_Types].xml".into(),
            Self::content_types_xml(engine, &layout),
        )?;
        part("_rels/.rels".into(), Self::root_rels_xml())?;
        part("xl/workbook.xml".into(), Self::workbook_xml(engine))?;
        part(
            "xl/_rels/workbook.xml.rels".into(),
            Self::workbook_rels_xml(engine),
        )?;
        part("xl/styles.xml".into(), style_table.to_styles_xml())?;

        for (i, sheet) in engine.worksheets().enumerate() {
            let is_active = i == engine.active_sheet();
            part(
                format!("xl/worksheets/sheet{}.xml", i + 1),
                Self::worksheet_xml(sheet, is_active, &layout, i),
            )?;

            if layout.sheet_has_rels(i) {
                part(
                    format!("xl/worksheets/_rels/sheet{}.xml.rels", i + 1),
                    Self::worksheet_rels_xml(&layout, i),
                )?;
            }

            if let Some(drawing) = layout.drawings[i] {
                part(
                    format!("xl/drawings/drawing{}.xml", drawing),
                    chart::drawing_xml(sheet.charts()),
                )?;
                part(
                    format!("xl/drawings/_rels/drawing{}.xml.rels", drawing),
                    chart::drawing_rels_xml(&layout.charts[i]),
                )?;
                for (spec, number) in sheet.charts().iter().zip(&layout.charts[i]) {
                    part(
                        format!("xl/charts/chart{}.xml", number),
                        chart::chart_xml(spec),
                    )?;
                }
            }
        }

        for (i, entry) in engine.pivot_tables().iter().enumerate() {
            let number = i + 1;
            let source = engine.worksheet(&entry.spec.source.sheet);
            part(
                format!("xl/pivotTables/pivotTable{}.xml", number),
                pivot::pivot_table_xml(entry, source, number),
            )?;
            part(
                format!("xl/pivotTables/_rels/pivotTable{}.xml.rels", number),
                pivot::pivot_table_rels_xml(number),
            )?;
            part(
                format!("xl/pivotCache/pivotCacheDefinition{}.xml", number),
                pivot::cache_definition_xml(entry, source),
            )?;
        }

        zip.finish()?;
        log::debug!(
            "wrote {} sheets, {} styles, {} pivot tables",
            engine.sheet_count(),
            engine.style_count(),
            layout.pivot_count
        );
        Ok(())
    }

    /// Fixed timestamp and permissions keep repeated saves byte-identical
    fn file_options(options: &SaveOptions) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(options.compression.method())
            .compression_level(options.compression.level())
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644)
    }

    fn content_types_xml(engine: &XlsxEngine, layout: &PackageLayout) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..engine.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        for drawing in layout.drawings.iter().flatten() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/drawings/drawing{}.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/>"#,
                drawing
            ));
        }

        for chart in layout.charts.iter().flatten() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/charts/chart{}.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.chart+xml"/>"#,
                chart
            ));
        }

        for number in 1..=layout.pivot_count {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/pivotTables/pivotTable{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.pivotTable+xml"/>
    <Override PartName="/xl/pivotCache/pivotCacheDefinition{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.pivotCacheDefinition+xml"/>"#,
                n = number
            ));
        }

        content.push_str("\n</Types>");
        content
    }

    fn root_rels_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
            .to_string()
    }

    fn workbook_xml(engine: &XlsxEngine) -> String {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <bookViews>
        <workbookView activeTab="{}"/>
    </bookViews>
    <sheets>"#,
            engine.active_sheet()
        );

        for (i, sheet) in engine.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }
        content.push_str("\n    </sheets>");

        let pivots = engine.pivot_tables();
        if !pivots.is_empty() {
            let first_rel = engine.sheet_count() + 2;
            content.push_str("\n    <pivotCaches>");
            for i in 0..pivots.len() {
                content.push_str(&format!(
                    "\n        <pivotCache cacheId=\"{}\" r:id=\"rId{}\"/>",
                    i + 1,
                    first_rel + i
                ));
            }
            content.push_str("\n    </pivotCaches>");
        }

        content.push_str("\n</workbook>");
        content
    }

    fn workbook_rels_xml(engine: &XlsxEngine) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        let sheet_count = engine.sheet_count();
        for i in 0..sheet_count {
            content.push_str(&relationship(
                i + 1,
                REL_WORKSHEET,
                &format!("worksheets/sheet{}.xml", i + 1),
            ));
        }
        content.push_str(&relationship(sheet_count + 1, REL_STYLES, "styles.xml"));
        for i in 0..engine.pivot_tables().len() {
            content.push_str(&relationship(
                sheet_count + 2 + i,
                REL_PIVOT_CACHE,
                &format!("pivotCache/pivotCacheDefinition{}.xml", i + 1),
            ));
        }

        content.push_str("\n</Relationships>");
        content
    }

    fn worksheet_xml(
        sheet: &Worksheet,
        is_active: bool,
        layout: &PackageLayout,
        index: usize,
    ) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        if let Some(dimension) = sheet.dimension() {
            content.push_str(&format!("\n    <dimension ref=\"{}\"/>", dimension));
        }

        Self::write_sheet_views(&mut content, sheet, is_active);
        content.push_str("\n    <sheetFormatPr defaultRowHeight=\"15\"/>");
        Self::write_columns(&mut content, sheet);
        Self::write_sheet_data(&mut content, sheet);

        let merged = sheet.merged_ranges();
        if !merged.is_empty() {
            content.push_str(&format!("\n    <mergeCells count=\"{}\">", merged.len()));
            for range in merged {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        Self::write_data_validations(&mut content, sheet.validations());

        if layout.drawings[index].is_some() {
            content.push_str("\n    <drawing r:id=\"rId1\"/>");
        }

        content.push_str("\n</worksheet>");
        content
    }

    fn write_sheet_views(content: &mut String, sheet: &Worksheet, is_active: bool) {
        let selected = if is_active { " tabSelected=\"1\"" } else { "" };
        match sheet.freeze_panes() {
            None => content.push_str(&format!(
                "\n    <sheetViews>\n        <sheetView{} workbookViewId=\"0\"/>\n    </sheetViews>",
                selected
            )),
            Some(at) => {
                let mut pane = String::from("<pane");
                if at.col > 0 {
                    pane.push_str(&format!(" xSplit=\"{}\"", at.col));
                }
                if at.row > 0 {
                    pane.push_str(&format!(" ySplit=\"{}\"", at.row));
                }
                let active_pane = match (at.row > 0, at.col > 0) {
                    (true, true) => "bottomRight",
                    (true, false) => "bottomLeft",
                    _ => "topRight",
                };
                pane.push_str(&format!(
                    " topLeftCell=\"{}\" activePane=\"{}\" state=\"frozen\"/>",
                    at, active_pane
                ));
                content.push_str(&format!(
                    "\n    <sheetViews>\n        <sheetView{} workbookViewId=\"0\">\n            {}\n            <selection pane=\"{}\"/>\n        </sheetView>\n    </sheetViews>",
                    selected, pane, active_pane
                ));
            }
        }
    }

    fn write_columns(content: &mut String, sheet: &Worksheet) {
        let mut widths = sheet.column_widths().peekable();
        if widths.peek().is_none() {
            return;
        }
        content.push_str("\n    <cols>");
        for (col, width) in widths {
            content.push_str(&format!(
                "\n        <col min=\"{c}\" max=\"{c}\" width=\"{}\" customWidth=\"1\"/>",
                width,
                c = col + 1
            ));
        }
        content.push_str("\n    </cols>");
    }

    fn write_sheet_data(content: &mut String, sheet: &Worksheet) {
        // Rows with a custom height are written even when they hold no cells
        let mut rows: BTreeMap<u32, Vec<(CellAddress, &Cell)>> = BTreeMap::new();
        for &row in sheet.row_heights().keys() {
            rows.entry(row).or_default();
        }
        for (addr, cell) in sheet.cells() {
            rows.entry(addr.row).or_default().push((addr, cell));
        }

        if rows.is_empty() {
            content.push_str("\n    <sheetData/>");
            return;
        }

        content.push_str("\n    <sheetData>");
        for (row, cells) in rows {
            let height = match sheet.row_height(row) {
                Some(h) => format!(" ht=\"{}\" customHeight=\"1\"", h),
                None => String::new(),
            };
            if cells.is_empty() {
                content.push_str(&format!("\n        <row r=\"{}\"{}/>", row + 1, height));
                continue;
            }
            content.push_str(&format!("\n        <row r=\"{}\"{}>", row + 1, height));
            for (addr, cell) in cells {
                content.push_str("\n            ");
                content.push_str(&cell_xml(addr, cell));
            }
            content.push_str("\n        </row>");
        }
        content.push_str("\n    </sheetData>");
    }

    fn write_data_validations(content: &mut String, validations: &[DataValidation]) {
        let validations: Vec<&DataValidation> =
            validations.iter().filter(|v| !v.ranges.is_empty()).collect();
        if validations.is_empty() {
            return;
        }

        content.push_str(&format!(
            "\n    <dataValidations count=\"{}\">",
            validations.len()
        ));

        for validation in validations {
            let operator_attr = match validation.kind.criteria() {
                Some(c) => format!(" operator=\"{}\"", c.operator.xml_name()),
                None => String::new(),
            };
            let allow_blank = if validation.allow_blank {
                " allowBlank=\"1\""
            } else {
                ""
            };
            // The attribute is inverted: showDropDown="1" hides the arrow
            let hide_dropdown = if validation.hide_dropdown {
                " showDropDown=\"1\""
            } else {
                ""
            };
            let show_input = if validation.prompt.is_some() {
                " showInputMessage=\"1\""
            } else {
                ""
            };
            let error_style = match validation.error_style {
                sheetcraft_core::ValidationErrorStyle::Stop => String::new(),
                other => format!(" errorStyle=\"{}\"", other.xml_name()),
            };
            let optional = |name: &str, value: &Option<String>| {
                value.as_ref().map_or(String::new(), |v| {
                    format!(" {}=\"{}\"", name, escape_xml(v))
                })
            };

            content.push_str(&format!(
                "\n        <dataValidation type=\"{}\"{}{}{}{} showErrorMessage=\"1\"{}{}{}{}{} sqref=\"{}\">",
                validation.kind.xml_name(),
                operator_attr,
                allow_blank,
                hide_dropdown,
                show_input,
                error_style,
                optional("errorTitle", &validation.error_title),
                optional("error", &validation.error),
                optional("promptTitle", &validation.prompt_title),
                optional("prompt", &validation.prompt),
                validation.sqref()
            ));
            content.push_str(&format!(
                "\n            <formula1>{}</formula1>",
                escape_xml(&validation.kind.formula1())
            ));
            if let Some(f2) = validation.kind.formula2() {
                content.push_str(&format!(
                    "\n            <formula2>{}</formula2>",
                    escape_xml(f2)
                ));
            }
            content.push_str("\n        </dataValidation>");
        }

        content.push_str("\n    </dataValidations>");
    }

    fn worksheet_rels_xml(layout: &PackageLayout, index: usize) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        let mut next_id = 1;
        if let Some(drawing) = layout.drawings[index] {
            content.push_str(&relationship(
                next_id,
                REL_DRAWING,
                &format!("../drawings/drawing{}.xml", drawing),
            ));
            next_id += 1;
        }
        for number in &layout.pivots[index] {
            content.push_str(&relationship(
                next_id,
                REL_PIVOT_TABLE,
                &format!("../pivotTables/pivotTable{}.xml", number),
            ));
            next_id += 1;
        }

        content.push_str("\n</Relationships>");
        content
    }
}

fn cell_xml(addr: CellAddress, cell: &Cell) -> String {
    let style_attr = match cell.style {
        Some(id) if id.0 != 0 => format!(" s=\"{}\"", id.0),
        _ => String::new(),
    };

    match &cell.value {
        CellValue::Empty => format!("<c r=\"{}\"{}/>", addr, style_attr),
        CellValue::Number(n) if !n.is_finite() => {
            format!("<c r=\"{}\"{} t=\"e\"><v>#NUM!</v></c>", addr, style_attr)
        }
        CellValue::Number(n) => format!("<c r=\"{}\"{}><v>{}</v></c>", addr, style_attr, n),
        CellValue::DateTime(dt) => format!(
            "<c r=\"{}\"{}><v>{}</v></c>",
            addr,
            style_attr,
            CellValue::to_serial(dt)
        ),
        CellValue::Boolean(b) => format!(
            "<c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
            addr,
            style_attr,
            if *b { 1 } else { 0 }
        ),
        CellValue::String(s) => {
            let space = if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
            {
                " xml:space=\"preserve\""
            } else {
                ""
            };
            format!(
                "<c r=\"{}\"{} t=\"inlineStr\"><is><t{}>{}</t></is></c>",
                addr,
                style_attr,
                space,
                escape_xml(s)
            )
        }
        CellValue::Formula(text) => format!(
            "<c r=\"{}\"{}><f>{}</f></c>",
            addr,
            style_attr,
            escape_xml(text)
        ),
    }
}

fn relationship(id: usize, kind: &str, target: &str) -> String {
    format!(
        "\n    <Relationship Id=\"rId{}\" Type=\"{}\" Target=\"{}\"/>",
        id, kind, target
    )
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcraft_core::{SpreadsheetEngine, StyleConfig};

    #[test]
    fn test_cell_xml() {
        let a1 = CellAddress::new(0, 0);
        let text = Cell {
            value: CellValue::from("R&D"),
            style: Some(sheetcraft_core::StyleId(2)),
        };
        assert_eq!(
            cell_xml(a1, &text),
            "<c r=\"A1\" s=\"2\" t=\"inlineStr\"><is><t>R&amp;D</t></is></c>"
        );
        let formula = Cell {
            value: CellValue::formula("=SUM(B1:B3)"),
            style: None,
        };
        assert_eq!(cell_xml(a1, &formula), "<c r=\"A1\"><f>SUM(B1:B3)</f></c>");
    }

    #[test]
    fn test_frozen_pane_view() {
        let mut engine = XlsxEngine::new();
        engine.create_sheet("S").unwrap();
        engine
            .freeze_panes("S", CellAddress::parse("B2").unwrap())
            .unwrap();
        let layout = PackageLayout::plan(&engine);
        let xml = XlsxWriter::worksheet_xml(engine.worksheet("S").unwrap(), true, &layout, 0);
        assert!(xml.contains(
            "<pane xSplit=\"1\" ySplit=\"1\" topLeftCell=\"B2\" activePane=\"bottomRight\" state=\"frozen\"/>"
        ));
        assert!(xml.contains("tabSelected=\"1\""));
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut engine = XlsxEngine::new();
        engine.create_sheet("S").unwrap();
        let bold = engine.register_style(&StyleConfig::new().bold(true)).unwrap();
        let a1 = CellAddress::new(0, 0);
        engine
            .set_cell_value("S", a1, CellValue::from("x"))
            .unwrap();
        engine.set_cell_style("S", a1, bold).unwrap();

        assert_eq!(engine.to_bytes().unwrap(), engine.to_bytes().unwrap());
    }
}
