//! API route handlers.
//!
//! All endpoints return JSON. The catalog and cost model are shared
//! read-only via `Arc<ApiState>`; every quote builds its own selection.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::engine::pricing::{to_channels, CostModel};
use crate::engine::projection::ProjectionPoint;
use crate::engine::selection::{
    channels_by_category, sensor_count_of, total_channels_of, Selection,
};
use crate::engine::{project_selection, quote};
use crate::types::{CalculatorError, CostBreakdown, Preset, SensorType};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ApiState {
    pub catalog: Arc<Catalog>,
    pub model: Arc<CostModel>,
    pub projection_years: u32,
}

impl ApiState {
    pub fn new(catalog: Arc<Catalog>, model: Arc<CostModel>, projection_years: u32) -> Self {
        Self {
            catalog,
            model,
            projection_years,
        }
    }
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MachineSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sensors: Vec<SensorType>,
    pub total_channels: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub sensors: Vec<SensorType>,
    pub machines: Vec<MachineSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetSummary {
    #[serde(flatten)]
    pub preset: Preset,
    pub total_channels: u64,
    pub sensor_count: u64,
}

/// `GET /api/quote` parameters. Signed so negatives reach validation.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteParams {
    pub channels: i64,
    #[serde(default)]
    pub sensors: Option<i64>,
}

/// `POST /api/quote` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub sensors: BTreeMap<String, i64>,
    #[serde(default)]
    pub machines: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub breakdown: CostBreakdown,
    pub channels_by_category: BTreeMap<String, u64>,
    pub projection: Vec<ProjectionPoint>,
}

impl IntoResponse for CalculatorError {
    fn into_response(self) -> Response {
        let status = match &self {
            CalculatorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CalculatorError::UnknownCatalogId { .. } => StatusCode::NOT_FOUND,
            CalculatorError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/catalog
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let machines = state
        .catalog
        .machines()
        .iter()
        .map(|m| MachineSummary {
            id: m.id.clone(),
            name: m.name.clone(),
            description: m.description.clone(),
            sensors: m.sensors.clone(),
            total_channels: m.channel_count(),
        })
        .collect();

    Json(CatalogResponse {
        sensors: state.catalog.sensors().to_vec(),
        machines,
    })
}

/// GET /api/presets
pub async fn get_presets(
    State(state): State<AppState>,
) -> Result<Json<Vec<PresetSummary>>, CalculatorError> {
    let mut summaries = Vec::with_capacity(state.catalog.presets().len());
    for preset in state.catalog.presets() {
        let selection = Selection::from_preset(preset);
        summaries.push(PresetSummary {
            preset: preset.clone(),
            total_channels: total_channels_of(&state.catalog, &selection)?,
            sensor_count: sensor_count_of(&state.catalog, &selection)?,
        });
    }
    Ok(Json(summaries))
}

/// GET /api/quote?channels=N[&sensors=M]
pub async fn get_quote(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<CostBreakdown>, CalculatorError> {
    let channels = to_channels(params.channels)?;
    let breakdown = match params.sensors {
        None => state.model.compute_cost(channels)?,
        Some(sensors) => {
            let sensors = u64::try_from(sensors).map_err(|_| {
                CalculatorError::InvalidInput(format!(
                    "sensor count must be non-negative, got {sensors}"
                ))
            })?;
            state.model.compute_cost_with_storage(channels, sensors)?
        }
    };
    Ok(Json(breakdown))
}

/// POST /api/quote
pub async fn post_quote(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<QuoteResponse>, CalculatorError> {
    let mut selection = Selection::new();
    for (sensor_id, &quantity) in &request.sensors {
        selection.set_sensor_quantity(&state.catalog, sensor_id, quantity)?;
    }
    for machine_id in &request.machines {
        selection.add_machine(&state.catalog, machine_id)?;
    }
    quote_response(&state, &selection)
}

/// POST /api/presets/:id/quote
pub async fn post_preset_quote(
    State(state): State<AppState>,
    Path(preset_id): Path<String>,
) -> Result<Json<QuoteResponse>, CalculatorError> {
    let preset = state.catalog.preset(&preset_id).inspect_err(|_| {
        warn!(preset = %preset_id, "Quote requested for unknown preset");
    })?;
    let selection = Selection::from_preset(preset);
    quote_response(&state, &selection)
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

fn quote_response(
    state: &ApiState,
    selection: &Selection,
) -> Result<Json<QuoteResponse>, CalculatorError> {
    let breakdown = quote(&state.catalog, &state.model, selection)?;
    let projection =
        project_selection(&state.catalog, &state.model, selection, state.projection_years)?;
    let channels_by_category = channels_by_category(&state.catalog, selection)?;
    debug!(
        total_channels = breakdown.total_channels,
        savings = %breakdown.savings,
        "Quote served"
    );
    Ok(Json(QuoteResponse {
        breakdown,
        channels_by_category,
        projection,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
