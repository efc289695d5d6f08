//! Route paths and the navigation seam

/// Route paths of the application
pub struct RoutesPath;

impl RoutesPath {
    pub const LOGIN: &'static str = "/";
    pub const BILLS: &'static str = "#employee/bills";
    pub const NEW_BILL: &'static str = "#employee/bill/new";
    pub const DASHBOARD: &'static str = "#admin/dashboard";
}

/// Navigation callback invoked by the containers
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}
