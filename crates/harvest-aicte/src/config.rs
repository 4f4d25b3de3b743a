//! AICTE pipeline configuration

use std::path::PathBuf;

use harvest_core::{FetchError, RetryPolicy};

use crate::state::Partition;

pub const DEFAULT_INDEX_URL: &str =
    "http://www.aicte-india.org/dashboard/pages/php/approvedinstituteserver.php";
pub const DEFAULT_DETAIL_URL: &str = "http://www.aicte-india.org/dashboard/pages/approved.php";
pub const DEFAULT_YEAR: &str = "2016-2017";

/// Index and detail endpoints of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Bulk JSON listing of a state's institutions
    pub index_url: String,
    /// HTML page listing an institution's approved courses
    pub detail_url: String,
    /// Academic year filter, e.g. `2016-2017`
    pub year: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            detail_url: DEFAULT_DETAIL_URL.to_string(),
            year: DEFAULT_YEAR.to_string(),
        }
    }
}

impl Endpoints {
    /// Index URL for one partition.
    pub fn index_url(&self, partition: Partition) -> Result<String, FetchError> {
        build_url(
            &self.index_url,
            &[
                ("method", "fetchdata"),
                ("year", self.year.as_str()),
                ("program", "1"),
                ("level", "1"),
                ("institutiontype", "1"),
                ("Women", "1"),
                ("Minority", "1"),
                ("state", partition.name()),
                ("course", ""),
            ],
        )
    }

    /// Detail URL for one institution.
    pub fn detail_url(&self, id: &str) -> Result<String, FetchError> {
        build_url(
            &self.detail_url,
            &[("aicteid", id), ("course", ""), ("year", self.year.as_str())],
        )
    }
}

fn build_url(base: &str, params: &[(&str, &str)]) -> Result<String, FetchError> {
    reqwest::Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| FetchError::InvalidUrl {
            url: base.to_string(),
            message: e.to_string(),
        })
}

/// Runtime configuration for a scrape run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one JSON document per partition
    pub output_dir: PathBuf,
    /// Partitions processed concurrently
    pub workers: usize,
    /// Single partition to scrape (`None` = all)
    pub partition: Option<Partition>,
    pub endpoints: Endpoints,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            workers: 1,
            partition: None,
            endpoints: Endpoints::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Partitions selected for this run
    pub fn partitions(&self) -> Vec<Partition> {
        match self.partition {
            Some(p) => vec![p],
            None => Partition::all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goa() -> Partition {
        Partition::from_name("Goa").unwrap()
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.workers, 1);
        assert_eq!(config.partitions().len(), 35);
    }

    #[test]
    fn single_partition_selection() {
        let config = Config {
            partition: Some(goa()),
            ..Config::default()
        };
        assert_eq!(config.partitions(), vec![goa()]);
    }

    #[test]
    fn index_url_encodes_state() {
        let tn = Partition::from_name("Tamil Nadu").unwrap();
        let url = Endpoints::default().index_url(tn).unwrap();
        assert!(url.starts_with(DEFAULT_INDEX_URL));
        assert!(url.contains("method=fetchdata"));
        assert!(url.contains("year=2016-2017"));
        assert!(url.contains("state=Tamil+Nadu"));
        assert!(url.ends_with("course="));
    }

    #[test]
    fn detail_url_carries_id() {
        let url = Endpoints::default().detail_url("1-12345").unwrap();
        assert_eq!(
            url,
            "http://www.aicte-india.org/dashboard/pages/approved.php?aicteid=1-12345&course=&year=2016-2017"
        );
    }

    #[test]
    fn malformed_base_is_invalid_url() {
        let endpoints = Endpoints {
            index_url: "not a url".to_string(),
            ..Endpoints::default()
        };
        let err = endpoints.index_url(goa()).unwrap_err();
        assert!(!err.is_retryable());
    }
}
