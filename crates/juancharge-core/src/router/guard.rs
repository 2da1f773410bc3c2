use tracing::debug;

use super::routes::RouteTable;
use crate::auth::{CredentialStore, StoreError};

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    /// Go to `to` instead. `resume` names the abandoned target when the
    /// redirect is to login, so it can be revisited after signing in.
    Redirect {
        to: &'static str,
        resume: Option<&'static str>,
    },
}

pub struct RouteGuard {
    table: RouteTable,
    store: CredentialStore,
}

impl RouteGuard {
    pub fn new(table: RouteTable, store: CredentialStore) -> Self {
        Self { table, store }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide a navigation from `from` (if any) to the route named `target`.
    ///
    /// The entry route is always allowed; it runs its own session check.
    /// Unknown targets are allowed here and rejected by the router.
    pub async fn check(&self, from: Option<&str>, target: &str) -> Result<Navigation, StoreError> {
        if target == self.table.entry() {
            return Ok(Navigation::Allow);
        }
        let Some(route) = self.table.get(target) else {
            return Ok(Navigation::Allow);
        };

        let authenticated = self.store.is_authenticated().await?;
        let decision = if route.meta.requires_auth && !authenticated {
            Navigation::Redirect {
                to: self.table.login(),
                resume: Some(route.name),
            }
        } else if route.meta.requires_guest && authenticated {
            Navigation::Redirect {
                to: self.table.home(),
                resume: None,
            }
        } else {
            Navigation::Allow
        };

        debug!(from = ?from, route = target, authenticated, decision = ?decision, "Route guard");
        Ok(decision)
    }
}
