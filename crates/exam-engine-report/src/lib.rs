//! exam-engine-report — Result pages and dashboard summaries.

pub mod html;
pub mod markdown;
