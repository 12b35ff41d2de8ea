pub mod osrm;

use async_trait::async_trait;

use crate::models::{Coordinates, Route};

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn route(&self, origin: Coordinates, destination: Coordinates) -> anyhow::Result<Route>;
}
