//! Request capability needed by the `request` key strategy.

use std::fmt;

use axum::extract::Query;
use axum::http::{request::Parts, HeaderMap, Request, Uri};

use crate::error::{CacheError, Result};

// == Request View ==
/// Minimal view of an incoming request: header lookup and query parameters.
///
/// Adapt a request type to this trait to key a cache by its query string.
pub trait RequestView: fmt::Debug + Send + Sync {
    /// Returns a header value. Names are matched case-insensitively.
    fn header(&self, name: &str) -> Option<String>;

    /// Returns the query parameters as a mapping, in order of each name's
    /// first appearance. A repeated name keeps its last value.
    fn query_params(&self) -> Result<Vec<(String, String)>>;
}

impl RequestView for Parts {
    fn header(&self, name: &str) -> Option<String> {
        header_value(&self.headers, name)
    }

    fn query_params(&self) -> Result<Vec<(String, String)>> {
        query_pairs(&self.uri)
    }
}

impl<B> RequestView for Request<B>
where
    B: fmt::Debug + Send + Sync,
{
    fn header(&self, name: &str) -> Option<String> {
        header_value(self.headers(), name)
    }

    fn query_params(&self) -> Result<Vec<(String, String)>> {
        query_pairs(self.uri())
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn query_pairs(uri: &Uri) -> Result<Vec<(String, String)>> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|err| CacheError::KeyDerivation(format!("malformed query string: {}", err)))?;

    let mut params: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (name, value) in pairs {
        match params.iter_mut().find(|(seen, _)| *seen == name) {
            Some(slot) => slot.1 = value,
            None => params.push((name, value)),
        }
    }
    Ok(params)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request<()> {
        Request::builder()
            .uri(uri)
            .header("Cache-Control", "no-cache")
            .body(())
            .unwrap()
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = request("/students");

        assert_eq!(req.header("CACHE-CONTROL").as_deref(), Some("no-cache"));
        assert_eq!(req.header("cache-control").as_deref(), Some("no-cache"));
        assert!(req.header("x-missing").is_none());
    }

    #[test]
    fn test_query_params_keep_order() {
        let req = request("/students?year=2024&page=2&building=north%20wing");

        let params = req.query_params().unwrap();
        assert_eq!(
            params,
            vec![
                ("year".to_string(), "2024".to_string()),
                ("page".to_string(), "2".to_string()),
                ("building".to_string(), "north wing".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_params_collapse_repeated_names() {
        let req = request("/students?year=2023&page=1&year=2024&building=north");

        let params = req.query_params().unwrap();
        assert_eq!(
            params,
            vec![
                ("year".to_string(), "2024".to_string()),
                ("page".to_string(), "1".to_string()),
                ("building".to_string(), "north".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_params_empty_without_query_string() {
        let req = request("/students");
        assert!(req.query_params().unwrap().is_empty());
    }

    #[test]
    fn test_parts_view_matches_request_view() {
        let (parts, _) = request("/students?year=2024").into_parts();

        assert_eq!(parts.header("Cache-Control").as_deref(), Some("no-cache"));
        assert_eq!(parts.query_params().unwrap().len(), 1);
    }
}
