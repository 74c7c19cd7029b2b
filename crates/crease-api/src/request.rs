// Request descriptors and endpoint template resolution.
//
// A descriptor is built per call and consumed by `ApiClient::send`.
// Endpoint templates use `{name}` or `:name` segments which are filled
// from the descriptor's path parameters and percent-encoded per segment.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::Error;
use crate::retry::RetryPolicy;

/// Path parameters substituted into endpoint templates.
pub type PathParams = BTreeMap<String, String>;

/// Query parameters, appended in key order.
pub type QueryMap = BTreeMap<String, String>;

/// One backend call: endpoint, parameters, method and optional body.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub(crate) method: Method,
    pub(crate) endpoint: String,
    pub(crate) path_params: PathParams,
    pub(crate) query: QueryMap,
    pub(crate) body: Option<Value>,
    pub(crate) retry: Option<RetryPolicy>,
    pub(crate) timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            path_params: PathParams::new(),
            query: QueryMap::new(),
            body: None,
            retry: None,
            timeout: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, body: &impl Serialize) -> Result<Self, Error> {
        Ok(Self::new(Method::POST, endpoint).with_body(serde_json::to_value(body)?))
    }

    pub fn put(endpoint: impl Into<String>, body: &impl Serialize) -> Result<Self, Error> {
        Ok(Self::new(Method::PUT, endpoint).with_body(serde_json::to_value(body)?))
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.path_params.insert(name.into(), value.to_string());
        self
    }

    pub fn path_params(mut self, params: PathParams) -> Self {
        self.path_params.extend(params);
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    pub fn query_params(mut self, params: QueryMap) -> Self {
        self.query.extend(params);
        self
    }

    /// Override the client's retry policy for this call only.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Per-request timeout, layered over the transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Resolve the full URL against `base`: substitute path parameters,
    /// then append any inline query from the template and the query map.
    pub fn resolve_url(&self, base: &Url) -> Result<Url, Error> {
        let (path, inline_query) = match self.endpoint.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (self.endpoint.as_str(), None),
        };

        let mut segments = Vec::new();
        for segment in path.trim_start_matches('/').split('/') {
            match placeholder(segment) {
                Some(name) => {
                    let value =
                        self.path_params
                            .get(name)
                            .ok_or_else(|| Error::MissingPathParam {
                                name: name.to_owned(),
                                endpoint: self.endpoint.clone(),
                            })?;
                    segments.push(value.as_str());
                }
                None => segments.push(segment),
            }
        }

        let mut url = base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if inline_query.is_some() || !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            if let Some(raw) = inline_query {
                pairs.extend_pairs(url::form_urlencoded::parse(raw.as_bytes()));
            }
            pairs.extend_pairs(self.query.iter());
        }

        Ok(url)
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(':')
        .or_else(|| segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
        .filter(|name| !name.is_empty())
}

/// Item endpoint template for a collection: `/game/teams/` becomes
/// `/game/teams/{id}/`, `/teams` becomes `/teams/{id}`.
pub fn item_endpoint(collection: &str) -> String {
    let trailing = collection.ends_with('/');
    let trimmed = collection.trim_end_matches('/');
    if trailing {
        format!("{trimmed}/{{id}}/")
    } else {
        format!("{trimmed}/{{id}}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://league.example/api/").unwrap()
    }

    #[test]
    fn collection_path_keeps_trailing_slash() {
        let url = RequestDescriptor::get("/game/teams/")
            .resolve_url(&base())
            .unwrap();
        assert_eq!(url.as_str(), "https://league.example/api/game/teams/");
    }

    #[test]
    fn base_without_path() {
        let base = Url::parse("http://127.0.0.1:8000").unwrap();
        let url = RequestDescriptor::get("/user/").resolve_url(&base).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/user/");
    }

    #[test]
    fn substitutes_both_placeholder_styles() {
        let url = RequestDescriptor::get("/game/tournament/{tournament}/groups/:group/")
            .path_param("tournament", 7)
            .path_param("group", "a b")
            .resolve_url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://league.example/api/game/tournament/7/groups/a%20b/"
        );
    }

    #[test]
    fn missing_path_param_is_an_error() {
        let err = RequestDescriptor::get("/game/player/{id}/")
            .resolve_url(&base())
            .unwrap_err();
        assert!(matches!(err, Error::MissingPathParam { ref name, .. } if name == "id"));
    }

    #[test]
    fn query_from_template_and_map() {
        let url = RequestDescriptor::get("/user/?limit=4000&offset=0")
            .query_param("search", "ab")
            .resolve_url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://league.example/api/user/?limit=4000&offset=0&search=ab"
        );
    }

    #[test]
    fn item_endpoint_follows_collection_style() {
        assert_eq!(item_endpoint("/game/teams/"), "/game/teams/{id}/");
        assert_eq!(item_endpoint("teams"), "teams/{id}");
    }
}
