//! Page routes: which view a URL path shows.
//!
//! The table is a plain immutable value. Whatever does the navigating owns a
//! `RouteTable` and asks it to [`resolve`](RouteTable::resolve) paths; there
//! is no global router.

use std::collections::BTreeMap;
use std::fmt;

use crate::CoreError;

/// A renderable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Landing page.
    Home,
    /// Detail page of a single algorithm. Takes an `id` input.
    AlgorithmDetail,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::AlgorithmDetail => f.write_str("algorithm-detail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// A path pattern bound to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pattern: String,
    segments: Vec<Segment>,
    view: View,
    name: Option<String>,
    props: bool,
}

impl Route {
    /// Create a route. Pattern segments starting with `:` capture a parameter.
    pub fn new(pattern: impl Into<String>, view: View) -> Self {
        let pattern = pattern.into();
        let segments = split_path(&pattern)
            .into_iter()
            .map(|s| match s.strip_prefix(':') {
                Some(param) => Segment::Param(param.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();

        Self {
            pattern,
            segments,
            view,
            name: None,
            props: false,
        }
    }

    /// Builder method to name the route for reverse lookup.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method to pass captured parameters to the view as inputs.
    pub fn with_props(mut self) -> Self {
        self.props = true;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn matches(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(s) => {
                    if !s.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), percent_decode(part));
                }
            }
        }
        Some(params)
    }
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub view: View,
    pub name: Option<String>,
    pub params: BTreeMap<String, String>,
    props: bool,
}

impl RouteMatch {
    /// A captured parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Inputs handed to the view. Empty unless the route passes props.
    pub fn props(&self) -> BTreeMap<String, String> {
        if self.props {
            self.params.clone()
        } else {
            BTreeMap::new()
        }
    }
}

/// Ordered, immutable set of routes. The first matching route wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The application's routes: algorithm detail and home.
    pub fn standard() -> Self {
        Self::new(vec![
            Route::new("/algorithm/:id", View::AlgorithmDetail)
                .named("algorithm")
                .with_props(),
            Route::new("/", View::Home),
        ])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve a requested path to a view.
    ///
    /// Query string and fragment are ignored and a single trailing slash is
    /// tolerated. Returns `None` when no route matches; there is no fallback.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let parts = split_path(path);

        self.routes.iter().find_map(|route| {
            route.matches(&parts).map(|params| RouteMatch {
                view: route.view,
                name: route.name.clone(),
                params,
                props: route.props,
            })
        })
    }

    /// Build the path of a named route from its parameters.
    pub fn path_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, CoreError> {
        let route = self
            .routes
            .iter()
            .find(|r| r.name() == Some(name))
            .ok_or_else(|| CoreError::UnknownRoute(name.to_string()))?;

        let mut path = String::new();
        for segment in &route.segments {
            path.push('/');
            match segment {
                Segment::Static(s) => path.push_str(s),
                Segment::Param(param) => {
                    let value = params
                        .iter()
                        .find(|(k, _)| *k == param.as_str())
                        .map(|(_, v)| *v)
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| CoreError::MissingRouteParam {
                            route: name.to_string(),
                            param: param.clone(),
                        })?;
                    path.push_str(&percent_encode(value));
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Split a path into segments, dropping the leading slash and one trailing slash.
fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_resolves_to_home() {
        let table = RouteTable::standard();
        let m = table.resolve("/").unwrap();
        assert_eq!(m.view, View::Home);
        assert!(m.params.is_empty());
        assert!(m.props().is_empty());
        assert_eq!(m.name, None);
    }

    #[test]
    fn test_algorithm_route_passes_id() {
        let table = RouteTable::standard();
        let m = table.resolve("/algorithm/42").unwrap();
        assert_eq!(m.view, View::AlgorithmDetail);
        assert_eq!(m.name.as_deref(), Some("algorithm"));
        assert_eq!(m.param("id"), Some("42"));
        assert_eq!(m.props().get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_trailing_slash_query_and_fragment() {
        let table = RouteTable::standard();
        assert_eq!(table.resolve("/algorithm/42/").unwrap().param("id"), Some("42"));
        assert_eq!(table.resolve("/algorithm/7?tab=logs").unwrap().param("id"), Some("7"));
        assert_eq!(table.resolve("/#top").unwrap().view, View::Home);
        assert_eq!(table.resolve("/ALGORITHM/9").unwrap().param("id"), Some("9"));
    }

    #[test]
    fn test_unmatched_paths() {
        let table = RouteTable::standard();
        assert!(table.resolve("/algorithm").is_none());
        assert!(table.resolve("/algorithm/").is_none());
        assert!(table.resolve("/algorithm/1/tasks").is_none());
        assert!(table.resolve("/datasets").is_none());
        assert!(table.resolve("/algorithm//1").is_none());
    }

    #[test]
    fn test_param_is_percent_decoded() {
        let table = RouteTable::standard();
        let m = table.resolve("/algorithm/a%20b").unwrap();
        assert_eq!(m.param("id"), Some("a b"));
        let m = table.resolve("/algorithm/100%").unwrap();
        assert_eq!(m.param("id"), Some("100%"));
    }

    #[test]
    fn test_props_only_when_enabled() {
        let table = RouteTable::new(vec![Route::new("/task/:id", View::AlgorithmDetail)]);
        let m = table.resolve("/task/3").unwrap();
        assert_eq!(m.param("id"), Some("3"));
        assert!(m.props().is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new(vec![
            Route::new("/algorithm/:id", View::AlgorithmDetail),
            Route::new("/algorithm/new", View::Home),
        ]);
        assert_eq!(table.resolve("/algorithm/new").unwrap().view, View::AlgorithmDetail);
    }

    #[test]
    fn test_path_for_named_route() {
        let table = RouteTable::standard();
        assert_eq!(table.path_for("algorithm", &[("id", "42")]).unwrap(), "/algorithm/42");
        assert_eq!(table.path_for("algorithm", &[("id", "a b")]).unwrap(), "/algorithm/a%20b");
    }

    #[test]
    fn test_path_for_errors() {
        let table = RouteTable::standard();
        assert!(matches!(
            table.path_for("dataset", &[]),
            Err(CoreError::UnknownRoute(_))
        ));
        assert!(matches!(
            table.path_for("algorithm", &[]),
            Err(CoreError::MissingRouteParam { .. })
        ));
    }

    #[test]
    fn test_path_for_round_trips_through_resolve() {
        let table = RouteTable::standard();
        let path = table.path_for("algorithm", &[("id", "x/y")]).unwrap();
        assert_eq!(table.resolve(&path).unwrap().param("id"), Some("x/y"));
    }
}
