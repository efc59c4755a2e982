//! Export-Layer: kanonischer JSON-Export/-Import und tabellarische Berichte.

pub mod json;
pub mod report;

pub use json::{
    export_document, import_session, load_session, parse_export, plan_from_document,
    to_json_string, write_export, ExportDocument, EXPORT_FORMAT_VERSION,
};
pub use report::{rooms_csv, walls_csv};
