pub mod analytics_service;
pub mod daily_aggregator;
pub mod trend_forecaster;
pub mod window_resolver;

pub use analytics_service::{AnalyticsQuery, AnalyticsService};
pub use daily_aggregator::{aggregate, DailyAggregation};
