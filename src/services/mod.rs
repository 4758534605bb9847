pub(crate) mod ai_questions;
pub(crate) mod assignments;
pub(crate) mod datalab_ocr;
pub(crate) mod question_source;
pub(crate) mod quiz_assembly;
pub(crate) mod quiz_timing;
pub(crate) mod scoring;
pub(crate) mod statistics;
