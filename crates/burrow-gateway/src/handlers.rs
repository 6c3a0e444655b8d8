mod health;
mod url;

pub use health::health_handler;
pub use url::{
    delete_url_handler, list_urls_handler, redirect_handler, shorten_handler, stats_handler,
};
