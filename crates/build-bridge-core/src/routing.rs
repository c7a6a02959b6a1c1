//! Static event-to-mapping routing.
//!
//! Each hook carries an ordered routing table. A route matches on the
//! provider event key and, optionally, on the payload action; the first
//! matching route wins. Events with no matching route are acknowledged and
//! ignored rather than treated as errors, so providers can send event kinds
//! the bridge does not care about.

use serde::{Deserialize, Serialize};

// ============================================================================
// Route
// ============================================================================

/// One routing rule: an event key, an optional action, and the name of the
/// field mapping to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Provider event key (`repo:refs_changed`, `push`, `pull_request`).
    pub event: String,

    /// Optional payload action (`opened`, `MERGED`). A route without an
    /// action matches the event regardless of action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Name of the field mapping to apply, resolved against the hook's
    /// configured mappings.
    pub mapping: String,
}

impl Route {
    /// Whether this route matches the given event key and action.
    ///
    /// Event and action comparison is case-insensitive; provider casing of
    /// event keys varies across versions.
    pub fn matches(&self, event: &str, action: Option<&str>) -> bool {
        if !self.event.eq_ignore_ascii_case(event) {
            return false;
        }
        match (&self.action, action) {
            (None, _) => true,
            (Some(want), Some(got)) => want.eq_ignore_ascii_case(got),
            (Some(_), None) => false,
        }
    }
}

// ============================================================================
// RoutingTable
// ============================================================================

/// An ordered set of routes; resolution is first-match in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    /// Create a table from routes in match order.
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Resolve an incoming event against the table.
    pub fn resolve(&self, event: &str, action: Option<&str>) -> RoutingDecision<'_> {
        match self.routes.iter().find(|route| route.matches(event, action)) {
            Some(route) => RoutingDecision::Matched(route),
            None => RoutingDecision::Ignored,
        }
    }

    /// The configured routes, in match order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ============================================================================
// RoutingDecision
// ============================================================================

/// Outcome of resolving an event against a routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision<'a> {
    /// The first route that matched the event.
    Matched(&'a Route),

    /// No route matched; the event is acknowledged but not acted on.
    Ignored,
}

impl RoutingDecision<'_> {
    pub fn is_ignored(&self) -> bool {
        matches!(self, RoutingDecision::Ignored)
    }
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
