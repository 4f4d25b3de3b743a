pub mod report;
pub mod scrape;
