pub mod frontier;
pub mod scrape;
pub mod web;

pub use frontier::{Frontier, FrontierEntry};
pub use scrape::scrape_page;
pub use web::crawl;
