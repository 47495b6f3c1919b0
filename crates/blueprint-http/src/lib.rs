mod error;
mod gateway;

pub use error::GatewayError;
pub use gateway::{SchemaGateway, error_response, json_response};
