//! Entity registry endpoint.

use axum::{Json, Router, extract::State, routing::get};
use consolidator_core::entity::{Entity, Relationship};
use serde::Serialize;

use crate::AppState;

/// Registry entities with their VAT jurisdiction.
#[derive(Debug, Serialize)]
pub struct EntitiesResponse {
    /// Entities in configured order.
    pub entities: Vec<EntityResponse>,
    /// Intercompany relationships.
    pub relationships: Vec<Relationship>,
}

/// One entity.
#[derive(Debug, Serialize)]
pub struct EntityResponse {
    /// Entity fields.
    #[serde(flatten)]
    pub entity: Entity,
    /// VAT jurisdiction.
    pub jurisdiction: Option<String>,
}

async fn list_entities(State(state): State<AppState>) -> Json<EntitiesResponse> {
    Json(EntitiesResponse {
        entities: state
            .registry
            .entities()
            .iter()
            .map(|entity| EntityResponse {
                jurisdiction: entity.jurisdiction(),
                entity: entity.clone(),
            })
            .collect(),
        relationships: state.registry.relationships().to_vec(),
    })
}

/// Creates entity routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/entities", get(list_entities))
}
