//! Label schemes: the configured mapping from score position to class name.
//!
//! Each endpoint picks its scheme once at startup (`VERINEWS_TEXT_LABEL_SCHEME`,
//! `VERINEWS_CLAIM_LABEL_SCHEME`). Schemes are versioned (`name@version`) so deployments can tell two label orders apart.

pub mod error;
pub mod scheme;


pub use error::SchemeError;
pub use scheme::{
    CUSTOM_SCHEME_NAME, FAKE_REAL_V1, Label, LabelScheme, NLI_VERDICT_V1, SINGLE_V1, SchemeId,
    SchemeKind,
};
