pub mod analytics_report;
pub mod daily_bucket;
pub mod forecast;
pub mod reporting_window;

pub use analytics_report::{AnalyticsReport, AnalyticsSummary};
pub use daily_bucket::DailyBucket;
pub use forecast::{Forecast, TrendLabel, TrendPoint};
pub use reporting_window::{Period, ReportingWindow};
