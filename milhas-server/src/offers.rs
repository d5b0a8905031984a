//! Offers search endpoint.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use milhas_core::{FlightOffer, SearchQuery, TripType};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Query string of `GET /offers/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersQuery {
    /// Origin airport code or label.
    pub origin: String,
    /// Destination airport code or label.
    pub destination: String,
    /// Outbound date, `YYYY-MM-DD`.
    pub departure_date: NaiveDate,
    /// Inbound date for round trips.
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    /// Trip type; inferred from `returnDate` when absent.
    #[serde(default)]
    pub trip_type: Option<TripType>,
    /// Adult passengers (default 1).
    #[serde(default)]
    pub adults: Option<u32>,
    /// Child passengers.
    #[serde(default)]
    pub children: Option<u32>,
    /// Lap infants.
    #[serde(default)]
    pub infants: Option<u32>,
}

impl OffersQuery {
    fn into_search_query(self) -> SearchQuery {
        let trip_type = self.trip_type.unwrap_or(if self.return_date.is_some() {
            TripType::RoundTrip
        } else {
            TripType::OneWay
        });

        SearchQuery {
            origin: self.origin,
            destination: self.destination,
            departure_date: self.departure_date,
            return_date: self.return_date,
            trip_type,
            adults: self.adults.unwrap_or(1),
            children: self.children.unwrap_or(0),
            infants: self.infants.unwrap_or(0),
        }
    }
}

/// Reply of `GET /offers/search`.
#[derive(Debug, Serialize)]
pub struct OffersResponse {
    /// Always true here; failures surface through [`AppError`].
    pub success: bool,
    /// Normalized offers.
    pub content: Vec<FlightOffer>,
    /// Provider-reported total result count.
    pub total_elements: i64,
    /// Recorded message when the provider payload was unreadable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs one offers search through the orchestrator.
#[instrument(skip(state, params), fields(
    origin = %params.origin,
    destination = %params.destination,
))]
pub async fn search_offers(
    State(state): State<AppState>,
    Query(params): Query<OffersQuery>,
) -> Result<Json<OffersResponse>, AppError> {
    let query = params.into_search_query();
    let parsed = state.client.search(&query).await?;

    Ok(Json(OffersResponse {
        success: true,
        content: parsed.offers,
        total_elements: parsed.total_elements,
        error: parsed.parse_error,
    }))
}

// ============================================================================
// Tests
// ============================================================================
