mod health;
mod url;

pub use health::HealthResponse;
pub use url::{
    ListUrlsQuery, ListUrlsResponse, MessageResponse, ShortenRequest, ShortenResponse,
    StatsResponse,
};
