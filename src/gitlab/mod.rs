pub mod error;
pub mod graphql;
pub mod rest;
mod transport;

pub use error::{Failure, normalize};
pub use graphql::GraphQLClient;
pub use rest::{Query, ResourceId, RestClient};
