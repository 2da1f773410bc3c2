/// Per-route navigation requirements. Both default to false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: &'static str,
    pub requires_auth: bool,
    pub requires_guest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub meta: RouteMeta,
}

impl Route {
    pub const fn new(name: &'static str, path: &'static str, title: &'static str) -> Self {
        Self {
            name,
            path,
            meta: RouteMeta {
                title,
                requires_auth: false,
                requires_guest: false,
            },
        }
    }

    pub const fn auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    pub const fn guest(mut self) -> Self {
        self.meta.requires_guest = true;
        self
    }
}

/// The set of named routes plus the three routes the guard redirects between.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    entry: &'static str,
    login: &'static str,
    home: &'static str,
}

impl RouteTable {
    /// Build a table. `entry`, `login` and `home` must name routes in `routes`.
    pub fn new(
        routes: Vec<Route>,
        entry: &'static str,
        login: &'static str,
        home: &'static str,
    ) -> Self {
        debug_assert!(
            [entry, login, home]
                .iter()
                .all(|name| routes.iter().any(|r| r.name == *name)),
            "entry, login and home must be registered routes"
        );
        Self {
            routes,
            entry,
            login,
            home,
        }
    }

    /// The JuanCharge app's routes.
    pub fn app() -> Self {
        Self::new(
            vec![
                Route::new("splash", "/", "Welcome"),
                Route::new("login", "/login", "Login").guest(),
                Route::new("register", "/register", "Register").guest(),
                Route::new("home", "/home", "Home").auth(),
                Route::new("map", "/map", "Map").auth(),
                Route::new("scan", "/scan", "Scan QR").auth(),
                Route::new("achievements", "/achievements", "Achievements").auth(),
                Route::new("settings", "/settings", "Settings").auth(),
            ],
            "splash",
            "login",
            "home",
        )
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn by_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Unauthenticated entry point; exempt from the guard.
    pub fn entry(&self) -> &'static str {
        self.entry
    }

    pub fn login(&self) -> &'static str {
        self.login
    }

    pub fn home(&self) -> &'static str {
        self.home
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_table() {
        let table = RouteTable::app();
        assert_eq!(table.iter().count(), 8);

        let splash = table.get("splash").unwrap();
        assert!(!splash.meta.requires_auth && !splash.meta.requires_guest);
        assert!(table.get("register").unwrap().meta.requires_guest);
        assert!(table.get("settings").unwrap().meta.requires_auth);
        assert_eq!(table.by_path("/scan").unwrap().meta.title, "Scan QR");
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn test_meta_defaults_to_open() {
        let meta = RouteMeta::default();
        assert!(!meta.requires_auth);
        assert!(!meta.requires_guest);
    }
}
