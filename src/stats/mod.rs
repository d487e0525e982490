//! Translation statistics: model, normalization, views and reports
//!
//! Raw rows come in from the extractor, a [`ResultSet`] goes out, and
//! filter/sort/report operate on result sets without any I/O. CSV export
//! writes to a caller-provided sink.

mod export;
mod normalize;
mod report;
mod types;
mod view;

pub use export::{write_csv, ExportRow};
pub use normalize::Normalizer;
pub use report::{language_report, LanguageReport, DEFAULT_REPORT_LEN};
pub use types::*;
pub use view::{apply, filter, sort};
