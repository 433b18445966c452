//! HTTP route handlers.

use std::collections::HashMap;
use std::time::Duration;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::domain::StationPair;
use crate::fares::{ConversionError, FareError, FareQuery, FareSource, aggregate_records};
use crate::filter::{FilterAction, FilterState, FilterStoreError, SavedFilters, recompute_cards};
use crate::geometry::{RouteMap, RouteShape};
use crate::predicate::{PredicateError, build_match};

use super::dto::*;
use super::state::AppState;

/// Longest accepted saved-filter name.
const MAX_FILTER_NAME_LEN: usize = 64;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/journeys", post(search_journeys))
        .route("/api/routes", get(resolve_routes))
        .route("/api/filters/:name", get(load_filters).post(update_filters))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search journeys: query the fare store, aggregate, apply facets.
async fn search_journeys(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<JourneysResponse>, AppError> {
    // Parse JSON manually so unknown keys are a 400 like every other bad input
    let req: JourneysRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "rejected journeys request");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let req = req.sanitized();
    let predicate = build_match(&req.filters)?;
    let query = FareQuery::new(predicate).with_date_range(req.date_from, req.date_to);

    let records = state.fares.fetch(&query).await?;
    let journeys = aggregate_records(&records)?;

    let facets = match req.facets {
        Some(facets) => facets.with_defaults(state.defaults.clone()),
        None => FilterState::new(state.defaults.clone()),
    };
    let visible = recompute_cards(&journeys, &facets, &req.cards);

    tracing::info!(
        records = records.len(),
        journeys = journeys.len(),
        visible = visible.len(),
        "journey search"
    );

    Ok(Json(JourneysResponse {
        total_journeys: journeys.len(),
        journeys: visible.iter().map(JourneyResult::from).collect(),
        facets,
    }))
}

/// Resolve route geometries for `?pairs=1-2,3-4`.
async fn resolve_routes(
    State(state): State<AppState>,
    Query(query): Query<RoutesQuery>,
) -> Result<Json<HashMap<String, RouteShape>>, AppError> {
    let pairs = parse_pairs(&query.pairs)?;

    let mut map = RouteMap::new(pairs.iter().copied());
    let resolved = state.geometry.resolve_batch(&pairs).await;
    map.merge_all(resolved.into_values());

    Ok(Json(map.to_response()))
}

fn parse_pairs(s: &str) -> Result<Vec<StationPair>, AppError> {
    let pairs = s
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<StationPair>().map_err(|e| AppError::BadRequest {
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if pairs.len() > MAX_ROUTE_PAIRS {
        return Err(AppError::BadRequest {
            message: format!("At most {MAX_ROUTE_PAIRS} pairs per request"),
        });
    }
    Ok(pairs)
}

/// Load a saved filter state, or the default state if none is saved.
async fn load_filters(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FilterState>, AppError> {
    validate_filter_name(&name)?;
    let saved = SavedFilters::new(state.filters.as_ref());
    let filters = saved
        .load(&name, state.defaults.clone())?
        .unwrap_or_else(|| FilterState::new(state.defaults.clone()));
    Ok(Json(filters))
}

/// Apply one action to a saved filter state and store the result.
async fn update_filters(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<FilterState>, AppError> {
    validate_filter_name(&name)?;
    let action: FilterAction = serde_json::from_slice(&body).map_err(|e| AppError::BadRequest {
        message: format!("Invalid filter action: {e}"),
    })?;

    let next = SavedFilters::new(state.filters.as_ref()).update(
        &name,
        state.defaults.clone(),
        |current| current.reduce(&action),
    )?;

    tracing::debug!(name = %name, ?action, "updated saved filters");
    Ok(Json(next))
}

fn validate_filter_name(name: &str) -> Result<(), AppError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_FILTER_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest {
            message: format!("Invalid filter name: {name:?}"),
        })
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    RateLimited { retry_after: Duration },
    Upstream { message: String },
    Internal { message: String },
}

impl From<PredicateError> for AppError {
    fn from(e: PredicateError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<FareError> for AppError {
    fn from(e: FareError) -> Self {
        match e.retry_after() {
            Some(retry_after) => AppError::RateLimited { retry_after },
            None => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(e: ConversionError) -> Self {
        AppError::Upstream {
            message: format!("Fare data rejected: {e}"),
        }
    }
}

impl From<FilterStoreError> for AppError {
    fn from(e: FilterStoreError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Rate limited; retry after {}s", retry_after.as_secs()),
            ),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message.clone()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        } else {
            tracing::warn!(%status, error = %message, "request rejected");
        }

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();
        if let AppError::RateLimited { retry_after } = self {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after.as_secs()),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::fares::{FareRecord, FileFareSource, fixtures::record};
    use crate::filter::{Facet, FilterDefaults, MemoryStore};
    use crate::geometry::DirectoryGeometryStore;
    use crate::web::state::{FareBackend, GeometryBackend};

    fn state_with(records: &[FareRecord]) -> (AppState, TempDir) {
        let dir = tempdir().unwrap();
        let fares_path = dir.path().join("fares.json");
        std::fs::write(&fares_path, serde_json::to_string(records).unwrap()).unwrap();
        std::fs::write(
            dir.path().join("1-2.json"),
            r#"{"coordinates": [[48.8, 2.3], [45.7, 4.8]]}"#,
        )
        .unwrap();

        let state = AppState::new(
            FareBackend::File(FileFareSource::new(&fares_path).unwrap()),
            GeometryBackend::Directory(DirectoryGeometryStore::new(dir.path())),
            MemoryStore::new(),
            FilterDefaults::default(),
        );
        (state, dir)
    }

    fn sample_records() -> Vec<FareRecord> {
        let mut max = record(1, 2, "sncf", 10);
        max.discount_card = "MAX".into();
        max.max_price = 120.0;
        let mut errored = record(1, 2, "sncf", 10);
        errored.is_error = true;
        vec![
            record(1, 2, "sncf", 10),
            record(1, 2, "ouigo", 11),
            record(3, 4, "ouigo", 10),
            max,
            errored,
        ]
    }

    async fn search(state: &AppState, body: &str) -> Result<JourneysResponse, AppError> {
        search_journeys(State(state.clone()), Bytes::from(body.to_string()))
            .await
            .map(|Json(r)| r)
    }

    #[tokio::test]
    async fn health_check() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn search_applies_default_exclusion() {
        let (state, _dir) = state_with(&sample_records());
        let response = search(&state, "{}").await.unwrap();

        assert_eq!(response.total_journeys, 2);
        let first = &response.journeys[0];
        assert_eq!(first.key.to_string(), "1-2");
        // errored row never fetched; MAX row counted but hidden
        assert_eq!(first.offer_count, 3);
        assert_eq!(first.offers.len(), 2);
        assert_eq!(first.display.max_price, 40.0);
        assert_eq!(first.raw.max_price, 120.0);
        assert!(response.facets.is_excluded(Facet::DiscountCard, "MAX"));
    }

    #[tokio::test]
    async fn search_filters_and_facets() {
        let (state, _dir) = state_with(&sample_records());
        let response = search(
            &state,
            r#"{
                "filters": {"selectedDates": ["2024-03-10"]},
                "facets": {"carrier": {"selected": ["ouigo"]}}
            }"#,
        )
        .await
        .unwrap();

        assert_eq!(response.total_journeys, 2);
        assert_eq!(response.journeys.len(), 1);
        assert_eq!(response.journeys[0].key.to_string(), "3-4");
    }

    #[tokio::test]
    async fn search_card_filter_replaces_facets() {
        let (state, _dir) = state_with(&sample_records());
        let response = search(
            &state,
            r#"{
                "facets": {"carrier": {"excluded": ["ouigo"]}},
                "cards": {"3-4": {"state": {}, "pinned": {}}}
            }"#,
        )
        .await
        .unwrap();

        // 3-4 is ouigo only; its card filter shows it despite the global exclusion
        assert_eq!(response.journeys.len(), 2);
        assert_eq!(response.journeys[1].key.to_string(), "3-4");
        assert!(!response.journeys[1].filters_active);
    }

    #[tokio::test]
    async fn search_rejects_bad_input() {
        let (state, _dir) = state_with(&sample_records());
        assert!(matches!(
            search(&state, r#"{"filters": {"bogus": 1}}"#).await,
            Err(AppError::BadRequest { .. })
        ));
        assert!(matches!(
            search(&state, r#"{"filters": {"selectedDates": ["March 10"]}}"#).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn search_rejects_unresolved_station() {
        let mut broken = record(1, 2, "sncf", 10);
        broken.arrival_station.id = None;
        let (state, _dir) = state_with(&[broken]);
        assert!(matches!(
            search(&state, "{}").await,
            Err(AppError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn routes_resolve_both_directions() {
        let (state, _dir) = state_with(&[]);
        let Json(routes) = resolve_routes(
            State(state),
            Query(RoutesQuery {
                pairs: "1-2, 2-1,5-6".into(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes["1-2"].coordinates[0], (48.8, 2.3));
        assert_eq!(routes["2-1"].coordinates[0], (45.7, 4.8));
    }

    #[test]
    fn parse_pairs_rejects_garbage() {
        assert!(parse_pairs("").unwrap().is_empty());
        assert!(parse_pairs("1-2,nope").is_err());
        assert!(parse_pairs("0-2").is_err());
    }

    #[tokio::test]
    async fn saved_filters_round_trip() {
        let (state, _dir) = state_with(&[]);

        let Json(initial) = load_filters(State(state.clone()), Path("home".into()))
            .await
            .unwrap();
        assert!(initial.is_excluded(Facet::DiscountCard, "MAX"));

        let Json(updated) = update_filters(
            State(state.clone()),
            Path("home".into()),
            Bytes::from(r#"{"action": "select", "facet": "carrier", "value": "sncf"}"#),
        )
        .await
        .unwrap();
        assert!(updated.is_selected(Facet::Carrier, "sncf"));

        let Json(loaded) = load_filters(State(state.clone()), Path("home".into()))
            .await
            .unwrap();
        assert_eq!(loaded, updated);

        let Json(cleared) = update_filters(
            State(state),
            Path("home".into()),
            Bytes::from(r#"{"action": "clear"}"#),
        )
        .await
        .unwrap();
        assert!(cleared.is_neutral(Facet::Carrier, "sncf"));
        assert!(cleared.is_excluded(Facet::DiscountCard, "MAX"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_filter_updates_all_land() {
        let (state, _dir) = state_with(&[]);
        let carriers: Vec<String> = (0..16).map(|i| format!("carrier{i}")).collect();

        let tasks: Vec<_> = carriers
            .iter()
            .map(|carrier| {
                let state = state.clone();
                let body = format!(r#"{{"action": "select", "facet": "carrier", "value": "{carrier}"}}"#);
                tokio::spawn(async move {
                    update_filters(State(state), Path("shared".into()), Bytes::from(body)).await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        let Json(loaded) = load_filters(State(state), Path("shared".into()))
            .await
            .unwrap();
        for carrier in &carriers {
            assert!(loaded.is_selected(Facet::Carrier, carrier), "{carrier} lost");
        }
    }

    #[test]
    fn filter_names() {
        assert!(validate_filter_name("home_2").is_ok());
        assert!(validate_filter_name("").is_err());
        assert!(validate_filter_name("../etc").is_err());
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = AppError::from(FareError::RateLimited {
            retry_after: Duration::from_secs(30),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    }

    #[test]
    fn error_statuses() {
        let status = |e: AppError| e.into_response().status();
        assert_eq!(
            status(PredicateError::InvalidDate("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(FareError::Unauthorized.into()), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status(AppError::Internal {
                message: "x".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
