use serde::Serialize;

use crate::db::models::ResultTotals;
use crate::services::scoring::round_half_up;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ExamStats {
    /// Active students, all of whom may sit any exam.
    pub(crate) assigned: i64,
    pub(crate) submissions: i64,
    /// Percent of submissions that passed.
    pub(crate) pass_rate: i32,
    /// Mean result percentage.
    pub(crate) avg_score: i32,
}

pub(crate) fn exam_stats(assigned: i64, totals: ResultTotals) -> ExamStats {
    if totals.submissions <= 0 {
        return ExamStats { assigned, submissions: 0, pass_rate: 0, avg_score: 0 };
    }

    let submissions = totals.submissions as f64;
    ExamStats {
        assigned,
        submissions: totals.submissions,
        pass_rate: round_half_up((totals.passed as f64 / submissions) * 100.0),
        avg_score: round_half_up(totals.percentage_sum as f64 / submissions),
    }
}
