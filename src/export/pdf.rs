//! The PDF report of the user's ledger.
//!
//! The report uses the built-in Helvetica fonts, which only cover the
//! Windows-1252 character set, so amounts are printed as plain numbers
//! without a currency symbol.

use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    category::get_categories,
    dashboard::{Totals, classification_map, compute_totals},
    html::format_currency,
    transaction::{Transaction, get_transactions},
    user::{UserID, get_user_by_id},
};

const PDF_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

// A4 page layout in millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;

const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 10.0;

struct PdfWriter {
    document: printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, Error> {
        let (document, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");

        let regular = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|error| Error::ExportError(error.to_string()))?;
        let bold = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|error| Error::ExportError(error.to_string()))?;

        let layer = document.get_page(page).get_layer(layer);

        Ok(Self {
            document,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn write_line(&mut self, text: &str, size: f32, bold: bool) {
        if self.y < MARGIN {
            let (page, layer) =
                self.document
                    .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
            self.layer = self.document.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }

        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
    }

    fn finish(self) -> Result<Vec<u8>, Error> {
        self.document
            .save_to_bytes()
            .map_err(|error| Error::ExportError(error.to_string()))
    }
}

/// Render the report as PDF bytes: title, the user's email, the totals, then
/// one line per transaction.
pub fn write_pdf(
    email: &str,
    totals: &Totals,
    transactions: &[Transaction],
) -> Result<Vec<u8>, Error> {
    let mut writer = PdfWriter::new("QuickLedger Report")?;

    writer.write_line("QuickLedger Report", TITLE_SIZE, true);
    writer.y -= LINE_HEIGHT / 2.0;
    writer.write_line(email, BODY_SIZE, false);
    writer.y -= LINE_HEIGHT / 2.0;

    writer.write_line(
        &format!("Income: {}", format_currency(totals.income)),
        BODY_SIZE,
        false,
    );
    writer.write_line(
        &format!("Expense: {}", format_currency(totals.expense)),
        BODY_SIZE,
        false,
    );
    writer.write_line(
        &format!("Balance: {}", format_currency(totals.balance)),
        BODY_SIZE,
        false,
    );
    writer.y -= LINE_HEIGHT / 2.0;

    writer.write_line("Amount  Category  Note  Date", BODY_SIZE, true);

    for transaction in transactions {
        let date = transaction
            .timestamp
            .format(PDF_DATE_FORMAT)
            .map_err(|error| Error::DateError(error.to_string()))?;

        writer.write_line(
            &format!(
                "{}  {}  {}  {}",
                format_currency(transaction.amount),
                transaction.category,
                transaction.note.as_deref().unwrap_or("-"),
                date,
            ),
            BODY_SIZE,
            false,
        );
    }

    writer.finish()
}

/// Serve the user's ledger as a PDF file download.
pub async fn export_pdf_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let user = get_user_by_id(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let transactions = get_transactions(user_id, &connection)?;

    let totals = compute_totals(&transactions, &classification_map(&categories));
    let bytes = write_pdf(&user.email, &totals, &transactions)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"report.pdf\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod pdf_export_tests {
    use axum::{Extension, extract::State};
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        AppState,
        dashboard::Totals,
        password::PasswordHash,
        test_utils::{assert_content_type, get_header},
        transaction::{Transaction, create_transaction},
        user::{UserID, create_user},
    };

    use super::{export_pdf_endpoint, write_pdf};

    fn test_totals() -> Totals {
        Totals {
            income: 100.0,
            expense: 40.0,
            balance: 60.0,
        }
    }

    #[test]
    fn output_is_a_pdf_document() {
        let bytes = write_pdf("foo@bar.baz", &test_totals(), &[]).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_ledgers_span_multiple_pages() {
        let transactions: Vec<_> = (0..200)
            .map(|index| Transaction {
                id: index,
                amount: 10.0,
                category: "Food".to_string(),
                note: None,
                timestamp: datetime!(2025-08-15 12:00 UTC),
                is_recurring: false,
                recurrence: None,
                user_id: UserID::new(1),
            })
            .collect();

        let bytes = write_pdf("foo@bar.baz", &test_totals(), &transactions).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        // Two hundred lines do not fit on a single A4 page. A single-page
        // document contains "/Type/Page" twice (once via "/Type/Pages").
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.matches("/Type/Page").count() > 2);
    }

    #[tokio::test]
    async fn endpoint_serves_attachment() {
        let state =
            AppState::new(Connection::open_in_memory().unwrap(), "wow much secret").unwrap();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_user(
                "foo@bar.baz",
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap();
            create_transaction(
                12.5,
                "Food",
                None,
                datetime!(2025-08-15 14:30 UTC),
                false,
                None,
                user.id,
                &connection,
            )
            .unwrap();
            user
        };

        let response = export_pdf_endpoint(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_content_type(&response, "application/pdf");
        assert!(get_header(&response, "content-disposition").contains("attachment"));
    }
}
