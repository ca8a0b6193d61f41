/// Dashboard aggregation
///
/// Read-only rollups over a user's active tasks: overall and per-week
/// status counts for the stats view, and per-day trends plus priority
/// distribution for the analytics view. Handlers fetch the relevant rows
/// and hand them to the pure functions here; nothing in this module
/// touches the database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::task::TaskStatus;

/// Number of recent week buckets returned by the stats view
const RECENT_WEEKS: usize = 4;

/// Row projection used for weekly stats
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskStatRow {
    /// Task status
    pub status: TaskStatus,

    /// Week bucket
    pub week_start: NaiveDate,
}

/// Row projection used for analytics
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskAnalyticsRow {
    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// Task status
    pub status: TaskStatus,

    /// Task priority
    pub priority: i16,
}

/// Status counts for a set of tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTotals {
    /// Total number of tasks
    pub total_tasks: i64,

    /// Tasks with completed status
    pub completed_tasks: i64,

    /// Tasks with pending status
    pub pending_tasks: i64,
}

/// Per-week status counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    /// Sunday the bucket starts on
    pub week_start: NaiveDate,

    /// Total number of tasks in the week
    pub total_tasks: i64,

    /// Completed tasks in the week
    pub completed_tasks: i64,

    /// Pending tasks in the week
    pub pending_tasks: i64,
}

/// Stats view payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Counts over all active tasks
    pub current_week: WeekTotals,

    /// The four most recent week buckets, newest first
    pub weekly_data: Vec<WeeklyBucket>,
}

/// Trailing window for the analytics view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Trailing 7 days
    Week,

    /// Trailing 30 days (default)
    Month,

    /// Trailing 365 days
    Year,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Month
    }
}

impl Timeframe {
    /// Number of trailing days covered by this timeframe
    pub fn days(&self) -> i64 {
        match self {
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Year => 365,
        }
    }

    /// String form used in query params and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }

    /// Parses a query-param value, falling back to the month default for
    /// anything unrecognized.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("week") => Timeframe::Week,
            Some("year") => Timeframe::Year,
            _ => Timeframe::Month,
        }
    }
}

/// One day of task creation activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Calendar day
    pub date: NaiveDate,

    /// Tasks created that day
    pub total_tasks: i64,

    /// Of those, tasks now completed
    pub completed_tasks: i64,
}

/// Task counts for one priority level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBucket {
    /// Priority level (1-3)
    pub priority: i16,

    /// Tasks at this priority
    pub count: i64,

    /// Of those, tasks now completed
    pub completed: i64,
}

/// Analytics view payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    /// Per-day creation trend, newest first
    pub trends: Vec<TrendPoint>,

    /// Task counts per priority level
    pub priority_distribution: Vec<PriorityBucket>,

    /// Timeframe the window covered
    pub timeframe: Timeframe,
}

/// Computes the stats view from a user's active task rows
///
/// Returns overall status counts plus per-week buckets for the four most
/// recent weeks, sorted descending by week start.
pub fn weekly_stats(rows: &[TaskStatRow]) -> StatsResponse {
    let mut totals = WeekTotals::default();
    let mut weeks: std::collections::HashMap<NaiveDate, WeekTotals> =
        std::collections::HashMap::new();

    for row in rows {
        totals.total_tasks += 1;
        let bucket = weeks.entry(row.week_start).or_default();
        bucket.total_tasks += 1;

        match row.status {
            TaskStatus::Completed => {
                totals.completed_tasks += 1;
                bucket.completed_tasks += 1;
            }
            TaskStatus::Pending => {
                totals.pending_tasks += 1;
                bucket.pending_tasks += 1;
            }
        }
    }

    let mut weekly_data: Vec<WeeklyBucket> = weeks
        .into_iter()
        .map(|(week_start, counts)| WeeklyBucket {
            week_start,
            total_tasks: counts.total_tasks,
            completed_tasks: counts.completed_tasks,
            pending_tasks: counts.pending_tasks,
        })
        .collect();

    weekly_data.sort_by(|a, b| b.week_start.cmp(&a.week_start));
    weekly_data.truncate(RECENT_WEEKS);

    StatsResponse {
        current_week: totals,
        weekly_data,
    }
}

/// Computes the analytics view from a user's recent task rows
///
/// Rows are expected to already be filtered to the trailing window; this
/// function only aggregates. Trends are sorted descending by date; the
/// priority distribution is sorted ascending by priority.
pub fn analytics(rows: &[TaskAnalyticsRow], timeframe: Timeframe) -> AnalyticsResponse {
    let mut days: std::collections::HashMap<NaiveDate, (i64, i64)> =
        std::collections::HashMap::new();
    let mut priorities: std::collections::HashMap<i16, (i64, i64)> =
        std::collections::HashMap::new();

    for row in rows {
        let day = days.entry(row.created_at.date_naive()).or_default();
        day.0 += 1;

        let priority = priorities.entry(row.priority).or_default();
        priority.0 += 1;

        if row.status == TaskStatus::Completed {
            day.1 += 1;
            priority.1 += 1;
        }
    }

    let mut trends: Vec<TrendPoint> = days
        .into_iter()
        .map(|(date, (total, completed))| TrendPoint {
            date,
            total_tasks: total,
            completed_tasks: completed,
        })
        .collect();
    trends.sort_by(|a, b| b.date.cmp(&a.date));

    let mut priority_distribution: Vec<PriorityBucket> = priorities
        .into_iter()
        .map(|(priority, (count, completed))| PriorityBucket {
            priority,
            count,
            completed,
        })
        .collect();
    priority_distribution.sort_by_key(|bucket| bucket.priority);

    AnalyticsResponse {
        trends,
        priority_distribution,
        timeframe,
    }
}
