//! Dual-side merge policy.
//!
//! Once both faces of a two-sided document are finalized, their OCR results
//! combine into one record. The precedence is asymmetric: the back's
//! machine-readable zone is the higher-trust source for identity and
//! validity fields, while the front's printed text is the only source for
//! the address.

use serde::{Deserialize, Serialize};

use super::types::OcrResult;

/// The merged personal-data view of a dual-sided document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedFieldSet {
    pub document_number: Option<String>,
    pub full_name: Option<String>,
    /// CURP-equivalent national identifier.
    pub national_id: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub expiry_date: Option<String>,
}

/// Merge front and back OCR results per the precedence table:
///
/// | field            | source                         |
/// |------------------|--------------------------------|
/// | document_number  | back only (MRZ-origin)         |
/// | full_name        | back, else front               |
/// | national_id      | front, else back               |
/// | birth_date       | back, else front               |
/// | gender           | back, else front               |
/// | address          | front only                     |
/// | expiry_date      | back validity, else front      |
pub fn merge_sides(front: Option<&OcrResult>, back: Option<&OcrResult>) -> CombinedFieldSet {
    let front_fields = front.map(|r| &r.detected_fields);
    let back_fields = back.map(|r| &r.detected_fields);

    let pick = |primary: Option<&Option<String>>, fallback: Option<&Option<String>>| {
        primary
            .and_then(|f| f.clone())
            .or_else(|| fallback.and_then(|f| f.clone()))
    };

    CombinedFieldSet {
        document_number: back_fields.and_then(|f| f.ine_document_number.clone()),
        full_name: pick(
            back_fields.map(|f| &f.full_name),
            front_fields.map(|f| &f.full_name),
        ),
        national_id: pick(
            front_fields.map(|f| &f.curp),
            back_fields.map(|f| &f.curp),
        ),
        birth_date: pick(
            back_fields.map(|f| &f.birth_date),
            front_fields.map(|f| &f.birth_date),
        ),
        gender: pick(
            back_fields.map(|f| &f.gender),
            front_fields.map(|f| &f.gender),
        ),
        address: front_fields.and_then(|f| f.address.clone()),
        expiry_date: pick(
            back_fields.map(|f| &f.validity),
            front_fields.map(|f| &f.validity),
        ),
    }
}
