pub mod availability;
pub mod countdown;
pub mod exam;
pub(crate) mod question_ids;
pub(crate) mod result_stats;
pub mod scoring;
pub(crate) mod submission;
