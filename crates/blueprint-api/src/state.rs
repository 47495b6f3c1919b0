use std::sync::Arc;

use blueprint_http::SchemaGateway;
use blueprint_schema::Resolver;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SchemaGateway>,
    pub nonce: Arc<str>,
}

impl AppState {
    pub fn new(resolver: Resolver, nonce: &str) -> Self {
        Self {
            gateway: Arc::new(SchemaGateway::new(Arc::new(resolver))),
            nonce: Arc::from(nonce),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        self.gateway.resolver()
    }
}
