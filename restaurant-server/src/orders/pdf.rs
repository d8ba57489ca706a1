//! Invoice PDF rendering
//!
//! A4 pages using the built-in Helvetica fonts, so no font files are needed.
//! Item rows flow onto further pages when a page is full.

use chrono::DateTime;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use rust_decimal::Decimal;
use shared::error::AppError;
use shared::models::InvoiceDocument;
use thiserror::Error;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const ROW: i64 = 16;

/// x offsets of the item, quantity, unit price and subtotal columns
const COLUMNS: [i64; 4] = [MARGIN, 320, 390, 480];
const MAX_NAME_CHARS: usize = 40;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

#[derive(Debug, Error)]
#[error("invoice pdf rendering failed: {0}")]
pub struct RenderError(String);

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::internal(err.to_string())
    }
}

/// Content streams of the pages written so far, plus the current baseline
struct Writer {
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl Writer {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, x: i64, font: &str, size: i64, value: &str) {
        let y = self.y;
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
        ));
        ops.push(Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(latin(value))]));
        ops.push(Operation::new("ET", vec![]));
    }

    fn rule(&mut self) {
        let y = self.y + ROW / 2;
        let ops = self.ops();
        ops.push(Operation::new("m", vec![Object::Integer(MARGIN), Object::Integer(y)]));
        ops.push(Operation::new(
            "l",
            vec![Object::Integer(PAGE_WIDTH - MARGIN), Object::Integer(y)],
        ));
        ops.push(Operation::new("S", vec![]));
    }

    /// Move down; start a new page when the bottom margin is reached.
    fn advance(&mut self, by: i64) {
        self.y -= by;
        if self.y < MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn row(&mut self, font: &str, cells: [&str; 4]) {
        for (x, cell) in COLUMNS.iter().zip(cells) {
            self.text(*x, font, 10, cell);
        }
        self.advance(ROW);
    }
}

/// Replace characters the standard fonts cannot show.
fn latin(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' })
        .collect()
}

fn money(value: Decimal) -> String {
    format!("{value:.2}")
}

fn date(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_default()
}

fn layout(doc: &InvoiceDocument) -> Writer {
    let invoice = &doc.invoice;
    let mut w = Writer::new();

    w.text(MARGIN, BOLD, 16, &doc.restaurant_name);
    w.advance(ROW + 4);
    w.text(MARGIN, REGULAR, 10, &doc.restaurant_address);
    w.advance(ROW * 2);

    w.text(MARGIN, BOLD, 12, &format!("Invoice #{}", invoice.id));
    w.advance(ROW + 4);
    w.text(MARGIN, REGULAR, 10, &format!("Date: {}", date(invoice.created_at)));
    w.text(COLUMNS[2], REGULAR, 10, &format!("Order ID: {}", invoice.order_id));
    w.advance(ROW);
    w.text(MARGIN, REGULAR, 10, &format!("Ordered: {}", date(doc.order_date)));
    w.text(COLUMNS[2], REGULAR, 10, &format!("Table: {}", doc.table_id));
    w.advance(ROW * 2);

    w.row(BOLD, ["Item", "Qty", "Unit Price", "Subtotal"]);
    w.rule();
    for line in &doc.lines {
        let name: String = line.food_name.chars().take(MAX_NAME_CHARS).collect();
        w.row(
            REGULAR,
            [
                &name,
                &line.quantity.to_string(),
                &money(line.unit_price),
                &money(line.subtotal),
            ],
        );
    }
    w.rule();

    w.row(REGULAR, ["", "", "Amount:", &money(invoice.amount)]);
    w.row(REGULAR, ["", "", "Tax:", &money(invoice.tax)]);
    w.row(BOLD, ["", "", "Total:", &money(invoice.total)]);
    w.advance(ROW);

    w.text(
        MARGIN,
        REGULAR,
        10,
        &format!(
            "Status: {}    Payment: {}",
            invoice.status.as_str(),
            invoice.payment_method.as_str()
        ),
    );
    w
}

/// Render the invoice as PDF bytes.
pub fn render(doc: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
    let writer = layout(doc);

    let mut pdf = Document::with_version("1.5");
    let pages_id = pdf.new_object_id();
    let regular = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular,
            BOLD => bold,
        },
    });

    let mut kids = Vec::with_capacity(writer.pages.len());
    for operations in writer.pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError(e.to_string()))?;
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)
        .map_err(|e| RenderError(e.to_string()))?;
    Ok(bytes)
}
