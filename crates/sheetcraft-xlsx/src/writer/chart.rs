//! DrawingML parts for charts: the sheet drawing and one chart part per chart

use sheetcraft_core::{ChartKind, ChartSeries, ChartSpec};

use super::{escape_xml, relationship, REL_CHART};

const CATEGORY_AXIS_ID: u32 = 500_000_001;
const VALUE_AXIS_ID: u32 = 500_000_002;

/// `xl/drawings/drawingN.xml` anchoring every chart of one sheet
pub(super) fn drawing_xml(charts: &[ChartSpec]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
    );

    for (i, chart) in charts.iter().enumerate() {
        let from = chart.anchor.from;
        let to = chart.anchor.to();
        let title = chart
            .title
            .as_deref()
            .map(escape_xml)
            .unwrap_or_else(|| format!("Chart {}", i + 1));
        xml.push_str(&format!(
            r#"
    <xdr:twoCellAnchor editAs="oneCell">
        <xdr:from><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
        <xdr:to><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>
        <xdr:graphicFrame macro="">
            <xdr:nvGraphicFramePr><xdr:cNvPr id="{}" name="{}"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr>
            <xdr:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></xdr:xfrm>
            <a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:id="rId{}"/></a:graphicData></a:graphic>
        </xdr:graphicFrame>
        <xdr:clientData/>
    </xdr:twoCellAnchor>"#,
            from.col,
            from.row,
            to.col,
            to.row,
            i + 2,
            title,
            i + 1
        ));
    }

    xml.push_str("\n</xdr:wsDr>");
    xml
}

/// Relationships from a drawing to its chart parts
pub(super) fn drawing_rels_xml(chart_numbers: &[usize]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, number) in chart_numbers.iter().enumerate() {
        xml.push_str(&relationship(
            i + 1,
            REL_CHART,
            &format!("../charts/chart{}.xml", number),
        ));
    }
    xml.push_str("\n</Relationships>");
    xml
}

/// `xl/charts/chartN.xml`
pub(super) fn chart_xml(chart: &ChartSpec) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<c:roundedCorners val="0"/>
<c:chart>"#,
    );

    match &chart.title {
        Some(title) => {
            xml.push_str(&title_xml(title));
            xml.push_str("<c:autoTitleDeleted val=\"0\"/>");
        }
        None => xml.push_str("<c:autoTitleDeleted val=\"1\"/>"),
    }

    xml.push_str("<c:plotArea><c:layout/>");
    xml.push_str(&plot_xml(chart));
    if chart.kind.has_axes() {
        xml.push_str(&axes_xml(chart));
    }
    xml.push_str("</c:plotArea>");

    if let Some(pos) = chart.legend.xml_code() {
        xml.push_str(&format!(
            "<c:legend><c:legendPos val=\"{}\"/><c:overlay val=\"0\"/></c:legend>",
            pos
        ));
    }

    xml.push_str("<c:plotVisOnly val=\"1\"/><c:dispBlanksAs val=\"gap\"/>");
    xml.push_str("</c:chart>\n</c:chartSpace>");
    xml
}

fn title_xml(text: &str) -> String {
    format!(
        "<c:title><c:tx><c:rich><a:bodyPr/><a:lstStyle/><a:p><a:pPr><a:defRPr/></a:pPr><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p></c:rich></c:tx><c:overlay val=\"0\"/></c:title>",
        escape_xml(text)
    )
}

fn plot_xml(chart: &ChartSpec) -> String {
    let series: String = chart
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| series_xml(i, s, chart.kind))
        .collect();
    let axis_ids = format!(
        "<c:axId val=\"{}\"/><c:axId val=\"{}\"/>",
        CATEGORY_AXIS_ID, VALUE_AXIS_ID
    );

    match chart.kind {
        ChartKind::Column | ChartKind::Bar => format!(
            "<c:barChart><c:barDir val=\"{}\"/><c:grouping val=\"clustered\"/><c:varyColors val=\"0\"/>{}<c:gapWidth val=\"150\"/>{}</c:barChart>",
            if chart.kind == ChartKind::Bar { "bar" } else { "col" },
            series,
            axis_ids
        ),
        ChartKind::Line => format!(
            "<c:lineChart><c:grouping val=\"standard\"/><c:varyColors val=\"0\"/>{}<c:marker val=\"1\"/>{}</c:lineChart>",
            series, axis_ids
        ),
        ChartKind::Area => format!(
            "<c:areaChart><c:grouping val=\"standard\"/><c:varyColors val=\"0\"/>{}{}</c:areaChart>",
            series, axis_ids
        ),
        ChartKind::Scatter => format!(
            "<c:scatterChart><c:scatterStyle val=\"lineMarker\"/><c:varyColors val=\"0\"/>{}{}</c:scatterChart>",
            series, axis_ids
        ),
        ChartKind::Pie => format!(
            "<c:pieChart><c:varyColors val=\"1\"/>{}<c:firstSliceAng val=\"0\"/></c:pieChart>",
            series
        ),
    }
}

fn series_xml(index: usize, series: &ChartSeries, kind: ChartKind) -> String {
    let mut xml = format!(
        "<c:ser><c:idx val=\"{i}\"/><c:order val=\"{i}\"/><c:tx><c:v>{}</c:v></c:tx>",
        escape_xml(&series.name),
        i = index
    );

    let values = escape_xml(&series.values.to_formula());
    if kind == ChartKind::Scatter {
        if let Some(x) = &series.categories {
            xml.push_str(&format!(
                "<c:xVal><c:numRef><c:f>{}</c:f></c:numRef></c:xVal>",
                escape_xml(&x.to_formula())
            ));
        }
        xml.push_str(&format!(
            "<c:yVal><c:numRef><c:f>{}</c:f></c:numRef></c:yVal><c:smooth val=\"0\"/>",
            values
        ));
    } else {
        if let Some(categories) = &series.categories {
            xml.push_str(&format!(
                "<c:cat><c:strRef><c:f>{}</c:f></c:strRef></c:cat>",
                escape_xml(&categories.to_formula())
            ));
        }
        xml.push_str(&format!(
            "<c:val><c:numRef><c:f>{}</c:f></c:numRef></c:val>",
            values
        ));
        if kind == ChartKind::Line {
            xml.push_str("<c:smooth val=\"0\"/>");
        }
    }

    xml.push_str("</c:ser>");
    xml
}

fn axes_xml(chart: &ChartSpec) -> String {
    let (x_pos, y_pos) = if chart.kind == ChartKind::Bar {
        ("l", "b")
    } else {
        ("b", "l")
    };
    let x_title = chart
        .x_axis_title
        .as_deref()
        .map(title_xml)
        .unwrap_or_default();
    let y_title = chart
        .y_axis_title
        .as_deref()
        .map(title_xml)
        .unwrap_or_default();

    // Scatter charts plot numbers on both axes
    let x_axis = if chart.kind == ChartKind::Scatter {
        format!(
            "<c:valAx><c:axId val=\"{}\"/><c:scaling><c:orientation val=\"minMax\"/></c:scaling><c:delete val=\"0\"/><c:axPos val=\"{}\"/>{}<c:numFmt formatCode=\"General\" sourceLinked=\"1\"/><c:tickLblPos val=\"nextTo\"/><c:crossAx val=\"{}\"/><c:crosses val=\"autoZero\"/><c:crossBetween val=\"midCat\"/></c:valAx>",
            CATEGORY_AXIS_ID, x_pos, x_title, VALUE_AXIS_ID
        )
    } else {
        format!(
            "<c:catAx><c:axId val=\"{}\"/><c:scaling><c:orientation val=\"minMax\"/></c:scaling><c:delete val=\"0\"/><c:axPos val=\"{}\"/>{}<c:tickLblPos val=\"nextTo\"/><c:crossAx val=\"{}\"/><c:crosses val=\"autoZero\"/><c:auto val=\"1\"/><c:lblAlgn val=\"ctr\"/><c:lblOffset val=\"100\"/><c:noMultiLvlLbl val=\"0\"/></c:catAx>",
            CATEGORY_AXIS_ID, x_pos, x_title, VALUE_AXIS_ID
        )
    };
    let cross_between = if chart.kind == ChartKind::Scatter {
        "midCat"
    } else {
        "between"
    };
    let y_axis = format!(
        "<c:valAx><c:axId val=\"{}\"/><c:scaling><c:orientation val=\"minMax\"/></c:scaling><c:delete val=\"0\"/><c:axPos val=\"{}\"/><c:majorGridlines/>{}<c:numFmt formatCode=\"General\" sourceLinked=\"1\"/><c:tickLblPos val=\"nextTo\"/><c:crossAx val=\"{}\"/><c:crosses val=\"autoZero\"/><c:crossBetween val=\"{}\"/></c:valAx>",
        VALUE_AXIS_ID, y_pos, y_title, CATEGORY_AXIS_ID, cross_between
    );

    x_axis + &y_axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcraft_core::{LegendPosition, SheetRange};

    fn spec(kind: ChartKind) -> ChartSpec {
        ChartSpec {
            kind,
            title: Some("Revenue & Cost".into()),
            series: vec![ChartSeries {
                name: "North".into(),
                categories: Some(SheetRange::parse("Data!A2:A4").unwrap()),
                values: SheetRange::parse("Data!B2:B4").unwrap(),
            }],
            legend: LegendPosition::Bottom,
            ..Default::default()
        }
    }

    #[test]
    fn test_column_chart() {
        let xml = chart_xml(&spec(ChartKind::Column));
        assert!(xml.contains("<c:barDir val=\"col\"/>"));
        assert!(xml.contains("<a:t>Revenue &amp; Cost</a:t>"));
        assert!(xml.contains("<c:cat><c:strRef><c:f>Data!$A$2:$A$4</c:f></c:strRef></c:cat>"));
        assert!(xml.contains("<c:legendPos val=\"b\"/>"));
        assert!(xml.contains("<c:catAx>"));
    }

    #[test]
    fn test_pie_has_no_axes() {
        let mut pie = spec(ChartKind::Pie);
        pie.legend = LegendPosition::Hidden;
        let xml = chart_xml(&pie);
        assert!(xml.contains("<c:pieChart>"));
        assert!(!xml.contains("<c:valAx>"));
        assert!(!xml.contains("<c:legend>"));
    }

    #[test]
    fn test_scatter_uses_value_axes() {
        let xml = chart_xml(&spec(ChartKind::Scatter));
        assert!(xml.contains("<c:xVal>"));
        assert_eq!(xml.matches("<c:valAx>").count(), 2);
    }
}
