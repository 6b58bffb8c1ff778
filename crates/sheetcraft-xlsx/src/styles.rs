//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::writer::escape_xml;
use sheetcraft_core::{
    Alignment, Border, BorderEdge, BorderLineStyle, Color, Fill, Font, HorizontalAlignment,
    NumberFormat, PatternType, StyleConfig, Underline, VerticalAlignment,
};

/// First id available to custom number formats
const FIRST_CUSTOM_NUMFMT_ID: u32 = 164;

// === Writing ===

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

/// Component tables for styles.xml
///
/// Each engine style becomes exactly one `cellXfs` entry so that style ids map
/// to `s` attributes unchanged. Fonts, fills, borders and number formats are
/// shared between entries.
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    numfmts: Vec<(u32, String)>,
    fonts: Vec<Font>,
    fills: Vec<Fill>,
    borders: Vec<Border>,
    xfs: Vec<(ResolvedXfIds, StyleConfig)>,
}

impl XlsxStyleTable {
    pub(crate) fn build(styles: &[StyleConfig]) -> Self {
        let mut font_ids: HashMap<Font, u32> = HashMap::new();
        let mut fonts: Vec<Font> = Vec::new();
        fonts.push(Font::default());
        font_ids.insert(Font::default(), 0);

        // The first two fills are reserved: none and gray125
        let mut fill_ids: HashMap<Fill, u32> = HashMap::new();
        let mut fills: Vec<Fill> = vec![
            Fill::None,
            Fill::pattern(PatternType::Gray125, Color::Auto, Color::Auto),
        ];
        fill_ids.insert(Fill::None, 0);

        let mut border_ids: HashMap<Border, u32> = HashMap::new();
        let mut borders: Vec<Border> = vec![Border::default()];
        border_ids.insert(Border::default(), 0);

        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();
        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut next_numfmt_id = FIRST_CUSTOM_NUMFMT_ID;

        let mut xfs = Vec::with_capacity(styles.len().max(1));
        let default_style = StyleConfig::default();
        let styles: &[StyleConfig] = if styles.is_empty() {
            std::slice::from_ref(&default_style)
        } else {
            styles
        };

        for style in styles {
            let font_id = *font_ids.entry(style.font().clone()).or_insert_with(|| {
                fonts.push(style.font().clone());
                fonts.len() as u32 - 1
            });

            let fill_id = *fill_ids.entry(style.fill().clone()).or_insert_with(|| {
                fills.push(style.fill().clone());
                fills.len() as u32 - 1
            });

            let border_id = *border_ids
                .entry(style.border().clone())
                .or_insert_with(|| {
                    borders.push(style.border().clone());
                    borders.len() as u32 - 1
                });

            let num_fmt_id = match style.format() {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => {
                    *numfmt_ids.entry(code.clone()).or_insert_with(|| {
                        let id = next_numfmt_id;
                        next_numfmt_id += 1;
                        numfmts.push((id, code.clone()));
                        id
                    })
                }
            };

            xfs.push((
                ResolvedXfIds {
                    font_id,
                    fill_id,
                    border_id,
                    num_fmt_id,
                },
                style.clone(),
            ));
        }

        Self {
            numfmts,
            fonts,
            fills,
            borders,
            xfs,
        }
    }

    pub(crate) fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !self.numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", self.numfmts.len()));
            for (id, code) in &self.numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", self.fonts.len()));
        for font in &self.fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", self.fills.len()));
        for fill in &self.fills {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(&format!("\n  <borders count=\"{}\">", self.borders.len()));
        for border in &self.borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.xfs.len()));
        for (ids, style) in &self.xfs {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " indexed=\"64\"".to_string(),
        Color::Theme { index, tint } => {
            if *tint == 0 {
                format!(" theme=\"{}\"", index)
            } else {
                format!(" theme=\"{}\" tint=\"{}\"", index, (*tint as f64) / 100.0)
            }
        }
        rgb => format!(" rgb=\"{}\"", rgb.to_argb_hex().unwrap_or_default()),
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    format!("<{tag}{}/>", color_attrs(color))
}

fn write_font(font: &Font) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    match font.underline.xml_value() {
        None => {}
        Some("single") => s.push_str("<u/>"),
        Some(v) => s.push_str(&format!("<u val=\"{}\"/>", v)),
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &Fill) -> String {
    match fill {
        Fill::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        Fill::Solid(color) => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
        Fill::Pattern {
            pattern,
            foreground,
            background,
        } => {
            if foreground.is_auto() && background.is_auto() {
                format!(
                    "<fill><patternFill patternType=\"{}\"/></fill>",
                    pattern.xml_name()
                )
            } else {
                format!(
                    "<fill><patternFill patternType=\"{}\">{}{}</patternFill></fill>",
                    pattern.xml_name(),
                    write_color("fgColor", foreground),
                    write_color("bgColor", background)
                )
            }
        }
    }
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        Some(e) if e.style != BorderLineStyle::None => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            e.style.xml_name(),
            write_color("color", &e.color)
        ),
        _ => format!("<{tag}/>"),
    }
}

fn write_border(border: &Border) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/></border>");
    s
}

fn write_alignment(al: &Alignment) -> String {
    if !al.is_set() {
        return String::new();
    }

    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.xml_name()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.xml_name()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    if al.rotation != 0 {
        // Negative angles are stored as 90 + |angle|
        let rotation = if al.rotation < 0 {
            90 - al.rotation
        } else {
            al.rotation
        };
        s.push_str(&format!(" textRotation=\"{}\"", rotation));
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &StyleConfig, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if ids.font_id != 0 {
        attrs.push_str(" applyFont=\"1\"");
    }
    if ids.fill_id != 0 {
        attrs.push_str(" applyFill=\"1\"");
    }
    if ids.border_id != 0 {
        attrs.push_str(" applyBorder=\"1\"");
    }
    let alignment_xml = write_alignment(style.alignment());
    if !alignment_xml.is_empty() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );
    if alignment_xml.is_empty() {
        s.push_str("/>");
    } else {
        s.push('>');
        s.push_str(&alignment_xml);
        s.push_str("</xf>");
    }
    s
}

// === Reading ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
    Diagonal,
}

#[derive(Debug, Default)]
struct PendingXf {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    alignment: Alignment,
}

/// Parse state for styles.xml
#[derive(Debug, Default)]
struct StylesParser {
    numfmts: HashMap<u32, String>,
    fonts: Vec<Font>,
    fills: Vec<Fill>,
    borders: Vec<Border>,
    cell_xfs: Vec<StyleConfig>,

    current_font: Option<Font>,
    in_fill: bool,
    fill_pattern: Option<PatternType>,
    fill_fg: Color,
    fill_bg: Color,
    current_border: Option<Border>,
    current_edge: Option<Edge>,
    in_cell_xfs: bool,
    current_xf: Option<PendingXf>,
}

impl StylesParser {
    fn start(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"numFmt" => {
                let id = attr_value(e, b"numFmtId").and_then(|s| s.parse().ok());
                let code = attr_value(e, b"formatCode");
                if let (Some(id), Some(code)) = (id, code) {
                    self.numfmts.insert(id, code);
                }
            }
            b"font" if !self.in_cell_xfs => self.current_font = Some(Font::default()),
            b"b" => {
                if let Some(font) = self.current_font.as_mut() {
                    font.bold = bool_attr(e, b"val").unwrap_or(true);
                }
            }
            b"i" => {
                if let Some(font) = self.current_font.as_mut() {
                    font.italic = bool_attr(e, b"val").unwrap_or(true);
                }
            }
            b"strike" => {
                if let Some(font) = self.current_font.as_mut() {
                    font.strikethrough = bool_attr(e, b"val").unwrap_or(true);
                }
            }
            b"u" => {
                if let Some(font) = self.current_font.as_mut() {
                    font.underline = attr_value(e, b"val")
                        .map(|v| Underline::from_xml(&v))
                        .unwrap_or(Underline::Single);
                }
            }
            b"sz" => {
                if let Some(font) = self.current_font.as_mut() {
                    if let Some(size) = attr_value(e, b"val").and_then(|v| v.parse().ok()) {
                        font.size = size;
                    }
                }
            }
            b"name" => {
                if let Some(font) = self.current_font.as_mut() {
                    if let Some(name) = attr_value(e, b"val") {
                        font.name = name;
                    }
                }
            }
            b"color" => {
                let color = parse_color_attrs(e);
                if let Some(font) = self.current_font.as_mut() {
                    font.color = color;
                } else if let (Some(border), Some(edge)) =
                    (self.current_border.as_mut(), self.current_edge)
                {
                    if let Some(existing) = border_edge_mut(border, edge) {
                        existing.color = color;
                    }
                }
            }
            b"fill" => {
                self.in_fill = true;
                self.fill_pattern = None;
                self.fill_fg = Color::Auto;
                self.fill_bg = Color::Auto;
            }
            b"patternFill" if self.in_fill => {
                self.fill_pattern = attr_value(e, b"patternType")
                    .map(|v| PatternType::from_xml_name(&v));
            }
            b"fgColor" if self.in_fill => self.fill_fg = parse_color_attrs(e),
            b"bgColor" if self.in_fill => self.fill_bg = parse_color_attrs(e),
            b"border" => self.current_border = Some(Border::default()),
            b"left" | b"right" | b"top" | b"bottom" | b"diagonal" => {
                let edge = match e.name().as_ref() {
                    b"left" => Edge::Left,
                    b"right" => Edge::Right,
                    b"top" => Edge::Top,
                    b"bottom" => Edge::Bottom,
                    _ => Edge::Diagonal,
                };
                if let Some(border) = self.current_border.as_mut() {
                    self.current_edge = Some(edge);
                    let style = attr_value(e, b"style")
                        .map(|v| BorderLineStyle::from_xml_name(&v))
                        .unwrap_or_default();
                    if style != BorderLineStyle::None {
                        set_border_edge(border, edge, BorderEdge::new(style, Color::Auto));
                    }
                }
            }
            b"cellXfs" => self.in_cell_xfs = true,
            b"xf" if self.in_cell_xfs => {
                let id = |key: &[u8]| {
                    attr_value(e, key)
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0)
                };
                self.current_xf = Some(PendingXf {
                    num_fmt_id: id(b"numFmtId"),
                    font_id: id(b"fontId"),
                    fill_id: id(b"fillId"),
                    border_id: id(b"borderId"),
                    alignment: Alignment::default(),
                });
            }
            b"alignment" => {
                if let Some(xf) = self.current_xf.as_mut() {
                    read_alignment(e, &mut xf.alignment);
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"font" => {
                if let Some(font) = self.current_font.take() {
                    self.fonts.push(font);
                }
            }
            b"fill" if self.in_fill => {
                self.fills
                    .push(finalize_fill(self.fill_pattern, self.fill_fg, self.fill_bg));
                self.in_fill = false;
            }
            b"border" => {
                if let Some(border) = self.current_border.take() {
                    self.borders.push(border);
                }
                self.current_edge = None;
            }
            b"left" | b"right" | b"top" | b"bottom" | b"diagonal" => self.current_edge = None,
            b"xf" => {
                if let Some(xf) = self.current_xf.take() {
                    let style = self.resolve_style(xf);
                    self.cell_xfs.push(style);
                }
            }
            b"cellXfs" => self.in_cell_xfs = false,
            _ => {}
        }
    }

    fn resolve_style(&self, xf: PendingXf) -> StyleConfig {
        let number_format = if xf.num_fmt_id == 0 {
            NumberFormat::General
        } else if let Some(code) = self.numfmts.get(&xf.num_fmt_id) {
            NumberFormat::Custom(code.clone())
        } else {
            NumberFormat::BuiltIn(xf.num_fmt_id)
        };
        StyleConfig::new()
            .with_font(
                self.fonts
                    .get(xf.font_id as usize)
                    .cloned()
                    .unwrap_or_default(),
            )
            .with_fill(
                self.fills
                    .get(xf.fill_id as usize)
                    .cloned()
                    .unwrap_or_default(),
            )
            .with_border(
                self.borders
                    .get(xf.border_id as usize)
                    .cloned()
                    .unwrap_or_default(),
            )
            .with_alignment(xf.alignment)
            .number_format(number_format)
    }
}

/// Read the `cellXfs` table of styles.xml; index `n` is style id `n`
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<StyleConfig>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut parser = StylesParser::default();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.start(&e),
            Ok(Event::Empty(e)) => {
                parser.start(&e);
                parser.end(e.name().as_ref());
            }
            Ok(Event::End(e)) => parser.end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if parser.cell_xfs.is_empty() {
        parser.cell_xfs.push(StyleConfig::default());
    }
    Ok(parser.cell_xfs)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn bool_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<bool> {
    attr_value(e, key).map(|v| v != "0" && v != "false")
}

fn read_alignment(e: &BytesStart<'_>, align: &mut Alignment) {
    for attr in e.attributes().flatten() {
        let val = match attr.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attr.key.as_ref() {
            b"horizontal" => align.horizontal = HorizontalAlignment::from_xml_name(&val),
            b"vertical" => align.vertical = VerticalAlignment::from_xml_name(&val),
            b"wrapText" => align.wrap_text = val.as_ref() == "1" || val.as_ref() == "true",
            b"indent" => align.indent = val.parse::<u8>().unwrap_or(0),
            b"textRotation" => {
                let raw = val.parse::<i16>().unwrap_or(0);
                align.rotation = if (91..=180).contains(&raw) {
                    90 - raw
                } else {
                    raw.clamp(-90, 90)
                };
            }
            _ => {}
        }
    }
}

fn border_edge_mut(border: &mut Border, edge: Edge) -> Option<&mut BorderEdge> {
    match edge {
        Edge::Left => border.left.as_mut(),
        Edge::Right => border.right.as_mut(),
        Edge::Top => border.top.as_mut(),
        Edge::Bottom => border.bottom.as_mut(),
        Edge::Diagonal => None,
    }
}

fn set_border_edge(border: &mut Border, edge: Edge, value: BorderEdge) {
    match edge {
        Edge::Left => border.left = Some(value),
        Edge::Right => border.right = Some(value),
        Edge::Top => border.top = Some(value),
        Edge::Bottom => border.bottom = Some(value),
        Edge::Diagonal => {}
    }
}

fn finalize_fill(pattern: Option<PatternType>, fg: Color, bg: Color) -> Fill {
    match pattern.unwrap_or(PatternType::None) {
        PatternType::None => Fill::None,
        PatternType::Solid => Fill::Solid(fg),
        PatternType::Gray125 if fg.is_auto() && bg.is_auto() => Fill::None,
        p => Fill::pattern(p, fg, bg),
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed/auto
    if let Some(color) = attr_value(e, b"rgb").and_then(|rgb| Color::from_hex(&rgb)) {
        return color;
    }
    if let Some(index) = attr_value(e, b"theme").and_then(|v| v.parse::<u8>().ok()) {
        let tint = attr_value(e, b"tint")
            .and_then(|v| v.parse::<f64>().ok())
            .map(|t| (t * 100.0).round() as i8)
            .unwrap_or(0);
        return Color::theme(index, tint);
    }
    Color::Auto
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_components_are_shared() {
        let bold = StyleConfig::new().bold(true);
        let bold_currency = bold.clone().number_format(NumberFormat::currency());
        let table = XlsxStyleTable::build(&[StyleConfig::default(), bold, bold_currency]);
        assert_eq!(table.font_count(), 2);
        assert_eq!(table.numfmts, vec![(164, "\"$\"#,##0.00".to_string())]);
        assert_eq!(table.xfs.len(), 3);
        assert_eq!(table.xfs[1].0.font_id, table.xfs[2].0.font_id);
    }

    #[test]
    fn test_styles_xml_roundtrip() {
        let styles = vec![
            StyleConfig::default(),
            StyleConfig::new()
                .bold(true)
                .font_size(14.0)
                .font_color(Color::RED)
                .number_format(NumberFormat::currency()),
            StyleConfig::new()
                .fill_color(Color::YELLOW)
                .thin_border()
                .align(HorizontalAlignment::Center)
                .wrap_text(true)
                .number_format(NumberFormat::percent()),
        ];
        let xml = XlsxStyleTable::build(&styles).to_styles_xml();
        assert!(xml.contains("formatCode=\"&quot;$&quot;#,##0.00\""));

        let parsed = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(parsed, styles);
    }

    #[test]
    fn test_gray125_placeholder_reads_as_none() {
        assert_eq!(
            finalize_fill(Some(PatternType::Gray125), Color::Auto, Color::Auto),
            Fill::None
        );
        assert_eq!(
            finalize_fill(Some(PatternType::Solid), Color::BLUE, Color::Auto),
            Fill::Solid(Color::BLUE)
        );
    }
}
