//! Static route table with per-route protection metadata.
//!
//! Registered once at startup, never mutated. The guard consults only the
//! `requires_auth` flag of the segments a target matches.

/// Static metadata for one navigable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: &'static str,
    pub requires_auth: bool,
}

/// Page routes, in registration order.
pub const ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor { path: "/Home", name: "Home", requires_auth: true },
    RouteDescriptor { path: "/", name: "Login", requires_auth: false },
    RouteDescriptor { path: "/dashboard", name: "Dashboard", requires_auth: true },
];

/// Where denied navigations are redirected.
pub const LOGIN_PATH: &str = "/";

/// Descriptors whose path covers `target`, in table order.
///
/// A descriptor covers its own path and any descendant segment below it.
/// The root descriptor covers only `/` itself, so the login page's metadata
/// never shadows deeper paths.
#[must_use]
pub fn matched(target: &str) -> Vec<&'static RouteDescriptor> {
    ROUTES.iter().filter(|r| covers(r.path, target)).collect()
}

fn covers(route: &str, target: &str) -> bool {
    if route == "/" {
        return target == "/" || target.is_empty();
    }
    target == route || target.strip_prefix(route).is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
