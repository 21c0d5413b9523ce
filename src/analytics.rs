//! Usage analytics: bucketed sums, threshold alerts, and advisory
//! suggestions over in-memory record sets.
//!
//! Everything in this module is a pure function of `(records, now)`; no I/O,
//! no shared state. Callers fetch whatever record slice they are entitled to
//! see and hand it in. Accumulations are folds into insertion-ordered maps so
//! breakdown keys come out in first-seen order.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{CropType, Period, WaterSource, WaterUsage};

// ---

/// Liters per day above which a daily warning alert fires.
pub const DAILY_WARNING_LITERS: f64 = 5_000.0;
/// Liters per day above which the daily alert escalates to critical.
pub const DAILY_CRITICAL_LITERS: f64 = 10_000.0;
/// Liters per rolling week above which a weekly warning fires.
pub const WEEKLY_WARNING_LITERS: f64 = 30_000.0;
/// Borewell share of the weekly sum that triggers the source suggestion.
pub const BOREWELL_DOMINANCE_RATIO: f64 = 0.6;
/// Borewell share of a single farmer's total that flags an inefficiency.
pub const FARMER_BOREWELL_FLAG_RATIO: f64 = 0.7;
/// System report lists at most this many flagged farmers.
pub const MAX_FLAGGED_FARMERS: usize = 10;

const WATER_INTENSIVE_CROPS: [CropType; 2] = [CropType::Sugarcane, CropType::Rice];

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Source,
    Crop,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub message: String,
    pub priority: Priority,
}

/// Per-farmer analytics over one farmer's records.
///
/// Numeric fields are the bucket sums rounded to whole liters. The daily,
/// weekly, and monthly buckets overlap by construction (each is a lower
/// bound on the record date), so they do not partition the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub total_usage: i64,
    /// Mean usage per record, not per calendar day. The name is kept for
    /// compatibility with existing consumers of the payload.
    pub average_daily_usage: i64,
    pub daily_usage: i64,
    pub weekly_usage: i64,
    pub monthly_usage: i64,
    pub alerts: Vec<Alert>,
    pub suggestions: Vec<Suggestion>,
}

/// One flagged farmer in the system report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InefficiencyFlag {
    pub farmer_id: Uuid,
    pub issue: String,
    pub severity: Priority,
}

/// Cross-farmer analytics for the admin view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemReport {
    pub total_usage: i64,
    pub farmer_count: usize,
    pub avg_per_farmer: i64,
    pub source_distribution: IndexMap<&'static str, f64>,
    pub inefficiencies: Vec<InefficiencyFlag>,
}

// ---

/// Aggregate one farmer's records into a [`UsageReport`] as of `now`.
///
/// Bucket cutoffs: today is the start of `now`'s calendar day, the week is a
/// rolling `now - 7 days`, the month is the start of the same day-of-month
/// one calendar month earlier (clamped to the month's last day when the
/// day does not exist). Alerts compare the raw sums against the fixed
/// thresholds; suggestions scan the entire input, not the buckets.
pub fn usage_report(records: &[WaterUsage], now: DateTime<Utc>) -> UsageReport {
    // ---
    if records.is_empty() {
        return UsageReport {
            total_usage: 0,
            average_daily_usage: 0,
            daily_usage: 0,
            weekly_usage: 0,
            monthly_usage: 0,
            alerts: Vec::new(),
            suggestions: Vec::new(),
        };
    }

    let today_cutoff = day_start(now.date_naive());
    let week_cutoff = now - Duration::days(7);
    let month_cutoff = day_start(month_earlier(now.date_naive()));

    let total: f64 = records.iter().map(|r| r.usage_amount).sum();
    let daily = bucket_sum(records, today_cutoff);
    let weekly = bucket_sum(records, week_cutoff);
    let monthly = bucket_sum(records, month_cutoff);
    let average = total / records.len() as f64;

    let mut alerts = Vec::new();
    if daily > DAILY_CRITICAL_LITERS {
        alerts.push(Alert {
            level: AlertLevel::Critical,
            message: format!("Today's water usage ({daily}L) exceeds critical threshold!"),
        });
    } else if daily > DAILY_WARNING_LITERS {
        alerts.push(Alert {
            level: AlertLevel::Warning,
            message: format!(
                "Today's water usage ({daily}L) is high. Consider optimizing irrigation."
            ),
        });
    }

    if weekly > WEEKLY_WARNING_LITERS {
        alerts.push(Alert {
            level: AlertLevel::Warning,
            message: format!("Weekly water usage ({weekly}L) is above average."),
        });
    }

    let suggestions = suggestions_for(records, weekly);

    UsageReport {
        total_usage: total.round() as i64,
        average_daily_usage: average.round() as i64,
        daily_usage: daily.round() as i64,
        weekly_usage: weekly.round() as i64,
        monthly_usage: monthly.round() as i64,
        alerts,
        suggestions,
    }
}

/// Advisory suggestions over the full record slice. `weekly_usage` is the
/// raw weekly bucket sum from the same report; the borewell rule compares
/// the all-time borewell sum against it. Never returns an empty list for a
/// non-empty input: a filler suggestion backstops the rule table.
pub fn suggestions_for(records: &[WaterUsage], weekly_usage: f64) -> Vec<Suggestion> {
    // ---
    let mut suggestions = Vec::new();

    let by_source = source_breakdown(records);
    if let Some(&borewell) = by_source.get(WaterSource::Borewell.as_str()) {
        if borewell > weekly_usage * BOREWELL_DOMINANCE_RATIO {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Source,
                message: "Heavy reliance on borewell. Consider using canal or rainwater \
                          harvesting."
                    .to_string(),
                priority: Priority::High,
            });
        }
    }

    let by_crop = crop_breakdown(records);
    for crop in by_crop.keys() {
        if WATER_INTENSIVE_CROPS.iter().any(|c| c.as_str() == *crop) {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Crop,
                message: format!(
                    "{} is water-intensive. Diversify with water-efficient crops.",
                    capitalize(crop)
                ),
                priority: Priority::Medium,
            });
        }
    }

    if suggestions.is_empty() {
        suggestions.push(Suggestion {
            kind: SuggestionKind::General,
            message: "Your water usage is well-managed. Keep monitoring irrigation schedules."
                .to_string(),
            priority: Priority::Low,
        });
    }

    suggestions
}

/// Source → summed liters over the slice, keys in first-seen order.
pub fn source_breakdown(records: &[WaterUsage]) -> IndexMap<&'static str, f64> {
    fold_amounts(records.iter().map(|r| (r.source.as_str(), r.usage_amount)))
}

/// Crop → summed liters over the slice, keys in first-seen order.
pub fn crop_breakdown(records: &[WaterUsage]) -> IndexMap<&'static str, f64> {
    fold_amounts(records.iter().map(|r| (r.crop_type.as_str(), r.usage_amount)))
}

/// Aggregate records across all farmers into the admin [`SystemReport`].
///
/// Flags every farmer whose borewell sum exceeds
/// [`FARMER_BOREWELL_FLAG_RATIO`] of their own total, in first-seen farmer
/// order, truncated to [`MAX_FLAGGED_FARMERS`] entries.
pub fn system_report(records: &[WaterUsage]) -> SystemReport {
    // ---
    let total: f64 = records.iter().map(|r| r.usage_amount).sum();

    let per_farmer: IndexMap<Uuid, IndexMap<&'static str, f64>> =
        records.iter().fold(IndexMap::new(), |mut acc, r| {
            *acc.entry(r.farmer_id)
                .or_default()
                .entry(r.source.as_str())
                .or_insert(0.0) += r.usage_amount;
            acc
        });

    let farmer_count = per_farmer.len();
    let avg_per_farmer = if farmer_count > 0 {
        (total / farmer_count as f64).round() as i64
    } else {
        0
    };

    let inefficiencies: Vec<InefficiencyFlag> = per_farmer
        .iter()
        .filter_map(|(farmer_id, sources)| {
            let farmer_total: f64 = sources.values().sum();
            let borewell = sources
                .get(WaterSource::Borewell.as_str())
                .copied()
                .unwrap_or(0.0);
            (borewell > 0.0 && borewell > farmer_total * FARMER_BOREWELL_FLAG_RATIO).then(|| {
                InefficiencyFlag {
                    farmer_id: *farmer_id,
                    issue: "Heavy borewell dependency".to_string(),
                    severity: Priority::High,
                }
            })
        })
        .take(MAX_FLAGGED_FARMERS)
        .collect();

    SystemReport {
        total_usage: total.round() as i64,
        farmer_count,
        avg_per_farmer,
        source_distribution: source_breakdown(records),
        inefficiencies,
    }
}

/// Lower date bound a `period` selector applies to the record fetch, or
/// `None` for `all`. This narrows the *input* to [`usage_report`]; the
/// report still computes its own three buckets on whatever it receives.
pub fn period_cutoff(period: Period, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    // ---
    match period {
        Period::Daily => Some(day_start(now.date_naive())),
        Period::Weekly => Some(now - Duration::days(7)),
        Period::Monthly => Some(day_start(month_earlier(now.date_naive()))),
        Period::All => None,
    }
}

// ---

fn bucket_sum(records: &[WaterUsage], cutoff: DateTime<Utc>) -> f64 {
    records
        .iter()
        .filter(|r| r.date >= cutoff)
        .map(|r| r.usage_amount)
        .sum()
}

/// Pure fold of `(key, amount)` pairs into an insertion-ordered sum map.
fn fold_amounts<'a, I>(pairs: I) -> IndexMap<&'a str, f64>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    pairs
        .into_iter()
        .fold(IndexMap::new(), |mut acc, (key, amount)| {
            *acc.entry(key).or_insert(0.0) += amount;
            acc
        })
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Same day-of-month one calendar month back, clamped to the last day of
/// the shorter month (Mar 31 -> Feb 28/29).
fn month_earlier(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(1)).unwrap_or(date)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
