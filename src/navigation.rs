//! Navigation surface
//!
//! Components never navigate themselves. They return a [`Navigation`] intent
//! and the caller decides how to follow it.

use serde::{Deserialize, Serialize};

/// Application routes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Tickets,
    Profile,
    Reports,
}

impl Route {
    /// Get all routes for iteration
    pub fn all() -> &'static [Route] {
        &[
            Route::Login,
            Route::Signup,
            Route::Dashboard,
            Route::Tickets,
            Route::Profile,
            Route::Reports,
        ]
    }

    /// URL path of this route
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Dashboard => "/dashboard",
            Route::Tickets => "/tickets",
            Route::Profile => "/profile",
            Route::Reports => "/reports",
        }
    }

    /// Resolve a URL path. Trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        Route::all().iter().copied().find(|r| r.path() == trimmed)
    }

    /// Whether entering this route requires a valid session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Signup)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// What the caller should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Full-page redirect to a route
    Redirect(Route),
}

impl Navigation {
    pub fn target(&self) -> Route {
        match self {
            Navigation::Redirect(route) => *route,
        }
    }
}

/// Entry in the dashboard sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
}

/// Sidebar entries, in display order
pub fn nav_items() -> &'static [NavItem] {
    &[
        NavItem {
            label: "Overview",
            route: Route::Dashboard,
        },
        NavItem {
            label: "My Tickets",
            route: Route::Tickets,
        },
        NavItem {
            label: "Profile / Settings",
            route: Route::Profile,
        },
        NavItem {
            label: "Reports",
            route: Route::Reports,
        },
    ]
}
