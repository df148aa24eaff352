//! Provider data structure passed to resources and data sources

use crate::api::{Client, User};
use std::sync::Arc;

/// Built once by Configure and shared read-only afterwards
#[derive(Clone)]
pub struct WoodpeckerProviderData {
    pub client: Arc<Client>,
    /// The user the token authenticates as
    pub self_user: User,
}

impl WoodpeckerProviderData {
    pub fn new(client: Client, self_user: User) -> Self {
        Self {
            client: Arc::new(client),
            self_user,
        }
    }
}
