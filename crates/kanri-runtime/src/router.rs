use serde::Serialize;

/// Screens the dashboard can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Home,
    Login,
    Dashboard,
    Admins,
    Settings,
    NotFound,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Sign in",
            Self::Dashboard => "Dashboard",
            Self::Admins => "Admins",
            Self::Settings => "Settings",
            Self::NotFound => "Page Not Found",
        }
    }
}

/// Chrome around a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Marketing navbar and footer.
    Public,
    /// Sidebar and topbar of the signed-in area.
    Admin,
    /// No surrounding chrome.
    Bare,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Admin => "admin",
            Self::Bare => "bare",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Exact(&'static str),
    /// Matches any path starting with the prefix.
    Splat(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct RouteDef {
    pattern: Pattern,
    page: Page,
    layout: Layout,
    protected: bool,
}

const fn exact(path: &'static str, page: Page, layout: Layout, protected: bool) -> RouteDef {
    RouteDef {
        pattern: Pattern::Exact(path),
        page,
        layout,
        protected,
    }
}

const fn splat(prefix: &'static str, page: Page, layout: Layout, protected: bool) -> RouteDef {
    RouteDef {
        pattern: Pattern::Splat(prefix),
        page,
        layout,
        protected,
    }
}

const ROUTES: &[RouteDef] = &[
    exact("/", Page::Home, Layout::Public, false),
    splat("/", Page::NotFound, Layout::Public, false),
    exact("/login", Page::Login, Layout::Bare, false),
    exact("/dashboard", Page::Dashboard, Layout::Admin, true),
    exact("/dashboard/admins", Page::Admins, Layout::Admin, true),
    exact("/dashboard/settings", Page::Settings, Layout::Admin, true),
    splat("/dashboard/", Page::NotFound, Layout::Admin, true),
];

/// Last resort when nothing in the table matches.
const GLOBAL_NOT_FOUND: RouteDef = splat("", Page::NotFound, Layout::Bare, false);

/// A path resolved against the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: String,
    pub page: Page,
    pub layout: Layout,
    pub protected: bool,
}

/// Canonical form used for matching: query and fragment dropped, lowercase,
/// single leading slash, no trailing slash, no empty segments.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect();
    format!("/{}", segments.join("/"))
}

/// Exact matches win; otherwise the longest matching splat prefix.
pub fn resolve(path: &str) -> Route {
    let path = normalize_path(path);

    let def = ROUTES
        .iter()
        .find(|r| matches!(r.pattern, Pattern::Exact(p) if p == path))
        .or_else(|| {
            ROUTES
                .iter()
                .filter_map(|r| match r.pattern {
                    Pattern::Splat(prefix) if path.starts_with(prefix) => Some((prefix.len(), r)),
                    _ => None,
                })
                .max_by_key(|(len, _)| *len)
                .map(|(_, r)| r)
        })
        .copied()
        .unwrap_or(GLOBAL_NOT_FOUND);

    Route {
        path,
        page: def.page,
        layout: def.layout,
        protected: def.protected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/Dashboard/"), "/dashboard");
        assert_eq!(normalize_path("dashboard//admins"), "/dashboard/admins");
        assert_eq!(normalize_path("/dashboard/admins?page=2#top"), "/dashboard/admins");
    }

    #[test]
    fn test_exact_routes() {
        let cases = [
            ("/", Page::Home, Layout::Public, false),
            ("/login", Page::Login, Layout::Bare, false),
            ("/dashboard", Page::Dashboard, Layout::Admin, true),
            ("/dashboard/admins", Page::Admins, Layout::Admin, true),
            ("/dashboard/settings/", Page::Settings, Layout::Admin, true),
        ];
        for (path, page, layout, protected) in cases {
            let route = resolve(path);
            assert_eq!((route.page, route.layout, route.protected), (page, layout, protected), "{path}");
        }
    }

    #[test]
    fn test_unknown_admin_path_stays_in_admin_layout() {
        let route = resolve("/dashboard/users");
        assert_eq!(route.page, Page::NotFound);
        assert_eq!(route.layout, Layout::Admin);
        assert!(route.protected);
    }

    #[test]
    fn test_unknown_public_path() {
        let route = resolve("/pricing");
        assert_eq!(route.page, Page::NotFound);
        assert_eq!(route.layout, Layout::Public);
        assert!(!route.protected);

        // "/dashboardx" is not under the admin subtree
        assert_eq!(resolve("/dashboardx").layout, Layout::Public);
    }
}
