pub mod root;
pub mod auth;
pub mod users;
pub mod courses;
pub mod payments;
pub mod enrollments;

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 10;

/// `?page=&page_size=`; missing or non-positive values fall back to defaults.
#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
    page: Option<i64>,
    page_size: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub list: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub message: String,
}

impl Ack {
    pub fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);

        let params = PageParams { page: Some(0), page_size: Some(-5) };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);

        let params = PageParams { page: Some(3), page_size: Some(500) };
        assert_eq!(params.page(), 3);
        assert_eq!(params.page_size(), 500);
    }
}
