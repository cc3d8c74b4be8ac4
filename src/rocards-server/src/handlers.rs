//! HTTP handlers, wire types and the OpenAPI document.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use rocards::Card;
use rocards_ledger::{Collection, CollectionEntry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// OpenAPI Schema
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rocards API",
        description = "Card catalog, pack opening and collection API",
        version = "0.1.0",
        license(name = "BSD-2-Clause"),
    ),
    paths(
        health,
        get_stats,
        list_cards,
        get_card,
        generate_card,
        open_pack,
        get_collection,
        add_to_collection,
        get_card_quantity,
    ),
    components(schemas(
        HealthResponse,
        StatsResponse,
        Card,
        GenerateRequest,
        OpenPackRequest,
        OpenPackResponse,
        CollectionEntry,
        Collection,
        CardRef,
        AddCardsRequest,
        MessageResponse,
        QuantityResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;

// =============================================================================
// Types
// =============================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub card_count: usize,
    pub rare_count: usize,
    pub normal_count: usize,
    pub rare_rate: f64,
    pub user_count: i64,
    pub entry_count: i64,
    pub total_cards: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenPackRequest {
    /// Cards in the pack; missing or non-positive means 8
    pub cards_per_pack: Option<i64>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OpenPackResponse {
    pub cards: Vec<Card>,
    pub count: usize,
}

/// Posted card; only the id is read, the rest comes from the catalog
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct CardRef {
    pub id: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddCardsRequest {
    /// Missing or null means no cards
    #[serde(default)]
    pub cards: Option<Vec<CardRef>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuantityResponse {
    pub user_id: String,
    pub card_id: i32,
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// Decode a JSON body where an empty body means "all defaults".
/// A non-empty body that does not parse is rejected.
fn parse_optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_body(body)
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}

/// Blank user ids mean "don't persist"
fn optional_user(user_id: Option<String>) -> Option<String> {
    user_id.filter(|id| !id.trim().is_empty())
}

fn require_user(user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::bad_request("userId is required"));
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "System"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Catalog and ledger statistics", body = StatsResponse)),
    tag = "System"
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let ledger = state.ledger.stats().await?;
    let catalog = state.engine.catalog();

    Ok(Json(StatsResponse {
        card_count: catalog.len(),
        rare_count: catalog.rare().len(),
        normal_count: catalog.normal().len(),
        rare_rate: state.engine.rare_rate(),
        user_count: ledger.user_count,
        entry_count: ledger.entry_count,
        total_cards: ledger.total_cards,
    }))
}

#[utoipa::path(
    get,
    path = "/api/cards",
    responses((status = 200, description = "Full card catalog", body = Vec<Card>)),
    tag = "Cards"
)]
pub async fn list_cards(State(state): State<Arc<AppState>>) -> Json<Vec<Card>> {
    Json(state.engine.catalog().cards().to_vec())
}

#[utoipa::path(
    get,
    path = "/api/cards/{card_id}",
    params(("card_id" = i32, Path, description = "Card identifier")),
    responses(
        (status = 200, description = "Card found", body = Card),
        (status = 404, description = "Card not found", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<i32>,
) -> Result<Json<Card>, ApiError> {
    state
        .engine
        .catalog()
        .get(card_id)
        .map(|card| Json(card.clone()))
        .ok_or_else(|| ApiError::NotFound(format!("Card not found: {}", card_id)))
}

#[utoipa::path(
    post,
    path = "/api/cards/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "A randomly drawn card", body = Card),
        (status = 400, description = "Malformed body", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn generate_card(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Card>, ApiError> {
    let req: GenerateRequest = parse_optional_body(&body)?;

    let card = state.engine.generate_one();
    if let Some(user_id) = optional_user(req.user_id) {
        state
            .ledger
            .add_cards(&user_id, std::slice::from_ref(&card))
            .await?;
    }

    Ok(Json(card))
}

#[utoipa::path(
    post,
    path = "/api/packs/open",
    request_body = OpenPackRequest,
    responses(
        (status = 200, description = "Pack contents", body = OpenPackResponse),
        (status = 400, description = "Malformed body or pack too large", body = ErrorResponse),
        (status = 429, description = "Too many pack openings", body = ErrorResponse)
    ),
    tag = "Packs"
)]
pub async fn open_pack(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<OpenPackResponse>, ApiError> {
    let req: OpenPackRequest = parse_optional_body(&body)?;
    let requested = req.cards_per_pack.unwrap_or(0);

    let size = rocards::pack_size(requested);
    if size > state.max_pack_size {
        return Err(ApiError::bad_request(format!(
            "cardsPerPack must be at most {}",
            state.max_pack_size
        )));
    }

    let cards = state.engine.generate_pack(requested);
    if let Some(user_id) = optional_user(req.user_id) {
        state.ledger.add_cards(&user_id, &cards).await?;
        tracing::info!(user_id = %user_id, count = cards.len(), "Opened pack");
    }

    Ok(Json(OpenPackResponse {
        count: cards.len(),
        cards,
    }))
}

#[utoipa::path(
    get,
    path = "/api/collection/{user_id}",
    params(("user_id" = String, Path, description = "Collection owner")),
    responses(
        (status = 200, description = "The user's collection", body = Collection),
        (status = 400, description = "Missing user id", body = ErrorResponse)
    ),
    tag = "Collection"
)]
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Collection>, ApiError> {
    require_user(&user_id)?;

    let collection = state.ledger.get_collection(&user_id).await?;
    Ok(Json(collection))
}

#[utoipa::path(
    post,
    path = "/api/collection/{user_id}",
    params(("user_id" = String, Path, description = "Collection owner")),
    request_body = AddCardsRequest,
    responses(
        (status = 200, description = "Cards added", body = MessageResponse),
        (status = 400, description = "Malformed body or unknown card", body = ErrorResponse)
    ),
    tag = "Collection"
)]
pub async fn add_to_collection(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    require_user(&user_id)?;
    let req: AddCardsRequest = parse_body(&body)?;

    // Store the catalog's copy; only the id is trusted from the client
    let catalog = state.engine.catalog();
    let cards = req
        .cards
        .unwrap_or_default()
        .into_iter()
        .map(|c| {
            catalog
                .get(c.id)
                .cloned()
                .ok_or_else(|| ApiError::bad_request(format!("Unknown card id: {}", c.id)))
        })
        .collect::<Result<Vec<Card>, ApiError>>()?;

    state.ledger.add_cards(&user_id, &cards).await?;

    Ok(Json(MessageResponse {
        message: "Cards added to collection".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/collection/{user_id}/cards/{card_id}",
    params(
        ("user_id" = String, Path, description = "Collection owner"),
        ("card_id" = i32, Path, description = "Card identifier")
    ),
    responses((status = 200, description = "Owned quantity (0 when absent)", body = QuantityResponse)),
    tag = "Collection"
)]
pub async fn get_card_quantity(
    State(state): State<Arc<AppState>>,
    Path((user_id, card_id)): Path<(String, i32)>,
) -> Result<Json<QuantityResponse>, ApiError> {
    require_user(&user_id)?;

    let quantity = state.ledger.get_card_quantity(&user_id, card_id).await?;
    Ok(Json(QuantityResponse {
        user_id,
        card_id,
        quantity,
    }))
}
