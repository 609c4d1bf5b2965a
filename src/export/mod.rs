//! CSV and PDF downloads of the user's ledger.

mod csv;
mod pdf;

pub(crate) use csv::export_csv_endpoint;
pub(crate) use pdf::export_pdf_endpoint;
