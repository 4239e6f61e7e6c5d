use chrono::{DateTime, FixedOffset, Timelike};
use rust_decimal::prelude::ToPrimitive;

use crate::modules::analytics::models::{DailyBucket, Forecast, TrendLabel, TrendPoint};

/// Dampener applied to the extrapolated full-day revenue
pub const PARTIAL_DAY_DAMPENER: f64 = 0.8;

/// Slope magnitude below which the trend is reported as stable
pub const TREND_DEAD_ZONE: f64 = 0.5;

/// Estimate a full day's revenue from the revenue so far today.
///
/// `now_local` must be on the EAT clock. Before 01:00 the raw value is
/// returned unchanged.
pub fn normalize_today(current_revenue: f64, now_local: DateTime<FixedOffset>) -> f64 {
    let hours_passed = now_local.hour() as f64 + now_local.minute() as f64 / 60.0;

    if hours_passed < 1.0 {
        return current_revenue;
    }

    (current_revenue / hours_passed) * 24.0 * PARTIAL_DAY_DAMPENER
}

/// Regression inputs for the buckets, in order.
///
/// When the last bucket is `today_key` its revenue is replaced with the
/// [`normalize_today`] estimate. The buckets themselves are not modified.
pub fn trend_points(
    buckets: &[DailyBucket],
    today_key: &str,
    now_local: DateTime<FixedOffset>,
) -> Vec<TrendPoint> {
    let last = buckets.len().saturating_sub(1);

    buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| {
            let revenue = bucket.total_revenue.to_f64().unwrap_or(0.0);
            let y = if index == last && bucket.date_key == today_key {
                normalize_today(revenue, now_local)
            } else {
                revenue
            };
            TrendPoint::new((index + 1) as f64, y)
        })
        .collect()
}

/// Ordinary least-squares fit with predictions for the last and next index.
///
/// Fewer than two points, or a zero denominator, yields [`Forecast::flat`].
pub fn fit(points: &[TrendPoint]) -> Forecast {
    let n = points.len();
    if n < 2 {
        return Forecast::flat();
    }

    let (sum_x, sum_y, sum_xy, sum_xx) = points.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), p| (sx + p.x, sy + p.y, sxy + p.x * p.y, sxx + p.x * p.x),
    );

    let n_f = n as f64;
    let denominator = n_f * sum_xx - sum_x * sum_x;
    if denominator == 0.0 || !denominator.is_finite() {
        return Forecast::flat();
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n_f;
    if !slope.is_finite() || !intercept.is_finite() {
        return Forecast::flat();
    }

    let current = slope * n_f + intercept;
    let next = slope * (n_f + 1.0) + intercept;

    Forecast {
        slope,
        intercept,
        current_period_prediction: current.max(0.0),
        next_period_prediction: next.max(0.0),
        trend: classify(slope),
    }
}

/// Growth above +0.5, decline below -0.5, stable otherwise (boundaries inclusive)
pub fn classify(slope: f64) -> TrendLabel {
    if slope > TREND_DEAD_ZONE {
        TrendLabel::Growth
    } else if slope < -TREND_DEAD_ZONE {
        TrendLabel::Decline
    } else {
        TrendLabel::Stable
    }
}
