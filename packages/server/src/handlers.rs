//! HTTP handler functions for the survey API.

use actix_web::{HttpResponse, web};
use mesa_agua_analytics::{
    apply_filter, build_map, dashboard_stats, date_bounds, fact_sheet_at, filter_options,
};
use mesa_agua_server_models::{
    ApiError, ApiFilters, ApiHealth, ApiMarkers, ApiStats, ApiTechnology, ApiVocabularyEntry,
    DetailQueryParams, FilterQueryParams, NO_DATA_AT_POINT,
};
use mesa_agua_water_point_models::{Category, Technology};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/categories`
///
/// Returns every technology with its map styling.
pub async fn categories() -> HttpResponse {
    let technologies: Vec<ApiTechnology> = Technology::all()
        .iter()
        .copied()
        .map(ApiTechnology::from)
        .collect();

    HttpResponse::Ok().json(technologies)
}

/// `GET /api/categories/{category}`
///
/// Returns the code-to-label table of one vocabulary.
pub async fn vocabulary(path: web::Path<String>) -> HttpResponse {
    let name = path.into_inner();
    match name.parse::<Category>() {
        Ok(category) => {
            let entries: Vec<ApiVocabularyEntry> = category
                .vocabulary()
                .into_iter()
                .map(|(code, label)| ApiVocabularyEntry {
                    code: code.to_string(),
                    label: label.to_string(),
                })
                .collect();
            HttpResponse::Ok().json(entries)
        }
        Err(e) => HttpResponse::BadRequest().json(ApiError::new(format!(
            "Unknown category '{name}': {e}"
        ))),
    }
}

/// `GET /api/filters`
///
/// Returns the date bounds, technologies and usage states to choose from.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    let fetched = state.fetcher.fetch_dataset().await;

    HttpResponse::Ok().json(ApiFilters {
        options: filter_options(&fetched.dataset),
        warning: fetched.warning.clone(),
    })
}

/// `GET /api/markers`
///
/// Returns one marker per filtered record plus the map centre.
pub async fn markers(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let fetched = state.fetcher.fetch_dataset().await;
    let spec = params.to_spec(date_bounds(&fetched.dataset));
    let filtered = apply_filter(&fetched.dataset, &spec);
    let view = build_map(&filtered);

    HttpResponse::Ok().json(ApiMarkers {
        filter: spec,
        center: view.center,
        total: view.markers.len() as u64,
        markers: view.markers,
        warning: fetched.warning.clone(),
    })
}

/// `GET /api/detail`
///
/// Returns the fact sheet of the filtered record at `lat`/`lon`.
pub async fn detail(
    state: web::Data<AppState>,
    params: web::Query<DetailQueryParams>,
) -> HttpResponse {
    let fetched = state.fetcher.fetch_dataset().await;
    let spec = params.filter().to_spec(date_bounds(&fetched.dataset));
    let filtered = apply_filter(&fetched.dataset, &spec);

    match fact_sheet_at(&filtered, params.point()) {
        Some(sheet) => HttpResponse::Ok().json(sheet),
        None => {
            log::debug!("No record at {}, {}", params.lat, params.lon);
            HttpResponse::NotFound().json(ApiError::new(NO_DATA_AT_POINT))
        }
    }
}

/// `GET /api/stats`
///
/// Returns the dashboard distributions over the filtered records.
pub async fn stats(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let fetched = state.fetcher.fetch_dataset().await;
    let spec = params.to_spec(date_bounds(&fetched.dataset));
    let stats = dashboard_stats(&apply_filter(&fetched.dataset, &spec));

    HttpResponse::Ok().json(ApiStats {
        filter: spec,
        stats,
        warning: fetched.warning.clone(),
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use mesa_agua_source::{SourceError, SubmissionApi, fetcher::DataFetcher};
    use serde_json::{Value, json};
    use std::time::Duration;

    use crate::{AppState, configure};

    struct FixtureApi {
        fail: bool,
    }

    #[async_trait]
    impl SubmissionApi for FixtureApi {
        async fn fetch_submissions(&self) -> Result<Vec<Value>, SourceError> {
            if self.fail {
                return Err(SourceError::Config {
                    message: "KOBO_TOKEN is not set".to_string(),
                });
            }
            Ok(vec![
                json!({
                    "_geolocation": [-31.5, -64.2],
                    "tecnolog": "represa",
                    "grupo/fecha_relevamiento": "2024-05-01",
                    "En_uso": "si",
                    "grupo/Estado_de_la_obra": "bueno",
                }),
                json!({
                    "_geolocation": [-30.0, -63.0],
                    "tecnolog": "AUTOMATIC_2",
                    "grupo/fecha_relevamiento": "2023-03-15",
                    "En_uso": "no",
                    "Problemas_asociados_al_No_uso": "cantidad_calidad_del_agua",
                }),
                json!({"_geolocation": [-29.0], "tecnolog": "represa"}),
            ])
        }
    }

    fn state(fail: bool) -> actix_web::web::Data<AppState> {
        actix_web::web::Data::new(AppState {
            fetcher: DataFetcher::new(Box::new(FixtureApi { fail }), Duration::from_secs(60)),
        })
    }

    async fn get(fail: bool, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state(fail)).configure(configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let (status, body) = get(false, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], json!(true));
    }

    #[actix_web::test]
    async fn markers_default_to_whole_dataset() {
        let (status, body) = get(false, "/api/markers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], json!(2));
        assert_eq!(body["filter"]["from"], json!("2023-03-15"));
        assert_eq!(body["filter"]["to"], json!("2024-05-01"));
        assert_eq!(body["warning"], Value::Null);
    }

    #[actix_web::test]
    async fn markers_apply_filters() {
        let (_, body) = get(false, "/api/markers?technology=Represa").await;
        assert_eq!(body["total"], json!(1));
        assert_eq!(body["markers"][0]["title"], json!("Represa"));

        let (_, body) = get(false, "/api/markers?from=2024-01-01&technology=Todas").await;
        assert_eq!(body["total"], json!(1));
        assert_eq!(body["markers"][0]["date"], json!("01/05/2024"));

        let (_, body) = get(false, "/api/markers?usage=no").await;
        assert_eq!(body["markers"][0]["usage"], json!("no"));
    }

    #[actix_web::test]
    async fn bad_date_is_a_json_bad_request() {
        let (status, body) = get(false, "/api/markers?from=mayo").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn detail_returns_fact_sheet() {
        let (status, body) = get(false, "/api/detail?lat=-30.0&lon=-63.0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], json!("Tanque australiano"));
        let problems = body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["label"] == json!("Problemas"))
            .unwrap();
        assert_eq!(problems["value"], json!("Cantidad/Calidad del agua"));
    }

    #[actix_web::test]
    async fn detail_outside_selection_is_not_found() {
        let (status, body) = get(false, "/api/detail?lat=0&lon=0").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("No se encontraron datos para este punto."));

        let (status, _) = get(false, "/api/detail?lat=-30.0&lon=-63.0&from=2024-01-01").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn detail_requires_coordinates() {
        let (status, body) = get(false, "/api/detail?lat=-30.0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn stats_cover_filtered_records() {
        let (status, body) = get(false, "/api/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], json!(2));
        assert_eq!(body["allInUse"], json!(false));
        assert_eq!(
            body["problems"],
            json!([{"label": "Cantidad/Calidad del agua", "count": 1}])
        );
    }

    #[actix_web::test]
    async fn filters_list_choices() {
        let (_, body) = get(false, "/api/filters").await;
        assert_eq!(body["dateFrom"], json!("2023-03-15"));
        assert_eq!(body["usageStates"], json!(["Todos", "no", "si"]));
        assert_eq!(body["technologies"][0], json!("Todas"));
    }

    #[actix_web::test]
    async fn vocabularies_by_name() {
        let (status, body) = get(false, "/api/categories/condition").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0], json!({"code": "bueno", "label": "Bueno"}));

        let (status, body) = get(false, "/api/categories/weather").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("weather"));

        let (_, body) = get(false, "/api/categories").await;
        assert_eq!(body.as_array().map(Vec::len), Some(9));
    }

    #[actix_web::test]
    async fn fetch_failure_degrades_to_empty_response() {
        let (status, body) = get(true, "/api/markers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], json!(0));
        assert!(body["warning"].as_str().unwrap().starts_with("Error:"));
    }
}
