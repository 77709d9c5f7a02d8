use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::repository::{AssessmentRecord, AssessmentSummary};
use super::scoring::{AttachmentStyle, Category};

const RECENT_LIMIT: usize = 10;
const DAILY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentStatistics {
    pub total: usize,
    pub avg_score: u8,
    pub min_score: u8,
    pub max_score: u8,
    pub category_distribution: Vec<CategoryCount>,
    pub attachment_distribution: Vec<AttachmentCount>,
    pub recent_assessments: Vec<AssessmentSummary>,
    pub daily_stats: Vec<DailyCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttachmentCount {
    pub style: AttachmentStyle,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Aggregate submissions as of `now`. Empty input yields zeroed scores.
///
/// Distributions list only categories and styles that occur, in their declaration order.
/// Daily counts cover the trailing 30 days, newest first, skipping days without submissions.
pub fn compute_statistics(records: &[AssessmentRecord], now: DateTime<Utc>) -> AssessmentStatistics {
    let scores: Vec<u32> = records
        .iter()
        .map(|record| u32::from(record.result.total_score))
        .collect();

    let (avg_score, min_score, max_score) = if scores.is_empty() {
        (0, 0, 0)
    } else {
        let sum: u32 = scores.iter().sum();
        let avg = (f64::from(sum) / scores.len() as f64 + 0.5).floor() as u8;
        let min = scores.iter().copied().min().unwrap_or(0) as u8;
        let max = scores.iter().copied().max().unwrap_or(0) as u8;
        (avg, min, max)
    };

    let category_distribution = Category::ALL
        .iter()
        .map(|category| CategoryCount {
            category: *category,
            count: records
                .iter()
                .filter(|record| record.result.category == *category)
                .count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();

    let attachment_distribution = AttachmentStyle::ALL
        .iter()
        .map(|style| AttachmentCount {
            style: *style,
            count: records
                .iter()
                .filter(|record| record.result.attachment_style == *style)
                .count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();

    let mut newest_first: Vec<&AssessmentRecord> = records.iter().collect();
    newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent_assessments = newest_first
        .iter()
        .take(RECENT_LIMIT)
        .map(|record| record.summary())
        .collect();

    let cutoff = now - Duration::days(DAILY_WINDOW_DAYS);
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| record.created_at > cutoff && record.created_at <= now)
    {
        *per_day.entry(record.created_at.date_naive()).or_default() += 1;
    }
    let daily_stats = per_day
        .into_iter()
        .rev()
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    AssessmentStatistics {
        total: records.len(),
        avg_score,
        min_score,
        max_score,
        category_distribution,
        attachment_distribution,
        recent_assessments,
        daily_stats,
    }
}
