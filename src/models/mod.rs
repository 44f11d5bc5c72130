mod analytics;
mod url;

pub use analytics::{AnalyticsEvent, TIMESTAMP_FORMAT};
pub use url::{ShortenRequest, ShortenResponse, UrlMapping};
