//! Page navigation

use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Views the client can send the user to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
        }
    }
}

/// Something that can change the current view
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that records every navigation instead of leaving the page
///
/// Front-ends without a real page (terminals, tests) use it to find out where
/// the session logic wanted to go.
#[derive(Debug, Default)]
pub struct NavigationLog {
    history: Mutex<Vec<Route>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All navigations so far, oldest first
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    /// Number of times `route` was requested
    pub fn count(&self, route: Route) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| **r == route)
            .count()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, route: Route) {
        info!(target_path = route.path(), "Navigating");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}
