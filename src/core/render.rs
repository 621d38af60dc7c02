//! PDF rendering of a [`ControlReport`].

use crate::config::ReportStyle;
use crate::core::layout::{FontFace, FontSpec, PageGeometry, PageSink, TextFlow};
use crate::domain::model::{scalar_text, ControlRecord, ControlReport, NOT_APPLICABLE};
use crate::utils::error::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

pub const REPORT_TITLE: &str = "OneTrust Controls Summary";
pub const SEPARATOR_WIDTH: usize = 90;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// [`PageSink`] that builds a PDF document with the standard Helvetica fonts.
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    operations: Vec<Operation>,
    media_box: Vec<Object>,
    font: FontSpec,
    title: String,
}

impl PdfWriter {
    pub fn new(title: &str) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => Object::Reference(regular_id),
                BOLD_FONT => Object::Reference(bold_id),
            },
        });

        Self {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            operations: Vec::new(),
            media_box: Vec::new(),
            font: FontSpec::BODY,
            title: title.to_string(),
        }
    }

    /// Writes the page tree, catalog and info dictionary and serialises the document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        let created = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::String(encode_text(&self.title), StringFormat::Literal),
            "Producer" => Object::string_literal(concat!("controls-report ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(created),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));

        let mut output = Vec::new();
        self.doc.save_to(&mut output)?;
        Ok(output)
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }
}

impl PageSink for PdfWriter {
    fn begin_page(&mut self, geometry: &PageGeometry) -> Result<()> {
        self.operations.clear();
        self.media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.width),
            Object::Real(geometry.height),
        ];
        Ok(())
    }

    fn set_font(&mut self, font: FontSpec) -> Result<()> {
        self.font = font;
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<()> {
        let font_name = match self.font.face {
            FontFace::Regular => REGULAR_FONT,
            FontFace::Bold => BOLD_FONT,
        };
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(font_name.as_bytes().to_vec()),
                    Object::Real(self.font.size),
                ],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_text(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => std::mem::take(&mut self.media_box),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(self.resources_id),
        });
        self.page_ids.push(page_id);
        Ok(())
    }
}

/// Encodes text for the WinAnsi-encoded standard fonts; unmappable characters become `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => ch as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            _ => b'?',
        })
        .collect()
}

pub fn title_line(report: &ControlReport, style: ReportStyle) -> String {
    match style {
        ReportStyle::Detailed => format!("{} - {}", REPORT_TITLE, report.company_name),
        ReportStyle::Basic => REPORT_TITLE.to_string(),
    }
}

pub fn average_line(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("Average Score of Applicable Controls: {:.2}", avg),
        None => format!("Average Score of Applicable Controls: {}", NOT_APPLICABLE),
    }
}

/// Labeled lines for one control, without the trailing separator.
pub fn control_lines(record: &ControlRecord, style: ReportStyle) -> Vec<String> {
    let field = |path: &str| record.text_or(path, NOT_APPLICABLE);
    let mut lines = vec![
        format!("Identifier    : {}", field("control.identifier")),
        format!("Name          : {}", field("control.name")),
        format!("Description   : {}", field("control.description")),
    ];
    if style == ReportStyle::Detailed {
        let value = record
            .applicable_score()
            .and_then(scalar_text)
            .unwrap_or_else(|| NOT_APPLICABLE.to_string());
        lines.push(format!("Value         : {}", value));
    }
    lines.push(format!("Effectiveness : {}", field("effectivenessInfo.name")));
    lines
}

/// Streams the whole report through `flow` in document order.
pub fn layout_report<S: PageSink>(
    flow: &mut TextFlow<S>,
    report: &ControlReport,
    style: ReportStyle,
) -> Result<()> {
    flow.set_font(FontSpec::TITLE)?;
    flow.emit(&title_line(report, style))?;
    flow.emit("")?;

    if style == ReportStyle::Detailed {
        flow.set_font(FontSpec::SUMMARY)?;
        flow.emit(&average_line(report.average_score))?;
        flow.emit("")?;
    }

    flow.set_font(FontSpec::BODY)?;
    let separator = "-".repeat(SEPARATOR_WIDTH);
    for record in &report.controls {
        for line in control_lines(record, style) {
            flow.emit(&line)?;
        }
        flow.emit(&separator)?;
    }
    Ok(())
}

/// Renders the report as a letter-size PDF.
pub fn render_report(report: &ControlReport, style: ReportStyle) -> Result<Vec<u8>> {
    let title = title_line(report, style);
    let mut flow = TextFlow::new(PdfWriter::new(&title), PageGeometry::letter());
    layout_report(&mut flow, report, style)?;
    let writer = flow.finalize()?;

    tracing::debug!(
        "Rendered {} controls onto {} pages",
        report.controls.len(),
        writer.page_count()
    );
    writer.finish()
}
