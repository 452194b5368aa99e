use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use super::AppState;

/// Request bodies above this are refused before parsing
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Declared `Content-Length` above [`MAX_BODY_BYTES`]
#[derive(Debug)]
struct BodyTooLarge;

impl warp::reject::Reject for BodyTooLarge {}

/// API Server Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("Invalid server address")
    }
}

/// HTTP front end for the price predictor
pub struct PredictionServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl PredictionServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Serve until Ctrl-C
    pub async fn start(&self) -> Result<()> {
        let cors = warp::cors()
            .allow_any_origin()
            .allow_methods(vec!["GET", "POST"])
            .allow_headers(vec!["Content-Type"]);

        let routes = routes(Arc::clone(&self.state))
            .with(cors)
            .with(warp::log::custom(|request| {
                info!(
                    method = %request.method(),
                    path = request.path(),
                    status = request.status().as_u16(),
                    elapsed_ms = request.elapsed().as_millis() as u64,
                    "Request handled"
                );
            }));

        let addr = self.config.socket_addr()?;

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
            })
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Starting {} v{} on {}", super::API_TITLE, super::API_VERSION, bound);
        server.await;
        info!("Server stopped");

        Ok(())
    }
}

/// All routes with rejection recovery applied
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    root_route()
        .or(predict_route(state))
        .recover(handle_rejection)
}

/// GET /
fn root_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::json(&super::usage()))
}

/// POST /predict/ (trailing slash optional)
fn predict_route(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("predict")
        .and(warp::path::end())
        .and(warp::post())
        .and(body_limit())
        .and(warp::body::json())
        .map(move |body: Value| super::predict(&state, &body))
}

/// Refuse oversized bodies when the length is declared; chunked bodies pass
fn body_limit() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(|length: Option<u64>| async move {
            match length {
                Some(length) if length > MAX_BODY_BYTES => Err(warp::reject::custom(BodyTooLarge)),
                _ => Ok(()),
            }
        })
        .untuple_one()
}

/// Map framework rejections to FastAPI-shaped error bodies
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, json!({ "detail": "Not Found" }))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "detail": [{
                    "loc": ["body"],
                    "msg": e.to_string(),
                    "type": "value_error.jsondecode"
                }]
            }),
        )
    } else if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "detail": [{
                    "loc": ["body"],
                    "msg": e.to_string(),
                    "type": "value_error.jsondecode"
                }]
            }),
        )
    } else if err.find::<BodyTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            json!({ "detail": "Request body too large" }),
        )
    } else if let Some(e) = err.find::<warp::reject::InvalidHeader>() {
        (StatusCode::BAD_REQUEST, json!({ "detail": e.to_string() }))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "detail": "Method Not Allowed" }),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "detail": "Internal Server Error" }),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PredictResponse;
    use crate::core::ArtifactError;
    use crate::features::ColumnSchema;
    use crate::ml::ModelArtifact;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use warp::test::request;

    fn body() -> Value {
        json!({
            "Gr_Liv_Area": 1500, "Garage_Area": 400, "Total_Bsmt_SF": 800,
            "Year_Built": 2000, "Year_Remod_Add": 2010, "Full_Bath": 2,
            "Fireplaces": 1, "TotRms_AbvGrd": 6, "Lot_Area": 8000,
            "Garage_Cars": 2, "MS_Zoning": "RL", "Neighborhood": "NAmes",
            "House_Style": "1Story", "Exter_Qual": "TA", "Kitchen_Qual": "TA"
        })
    }

    fn degraded_state() -> Arc<AppState> {
        let missing = || ArtifactError::Io {
            path: PathBuf::from("ames_ridge_model.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let columns = ColumnSchema::new(vec!["Age".to_string()]).unwrap();
        let artifact = ModelArtifact::new(Err(missing()), Ok(columns));
        Arc::new(AppState::new(Arc::new(artifact)).unwrap())
    }

    #[tokio::test]
    async fn test_root_describes_usage() {
        let resp = request()
            .method("GET")
            .path("/")
            .reply(&routes(degraded_state()))
            .await;

        assert_eq!(resp.status(), 200);
        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        assert!(body["message"].as_str().unwrap().contains("/predict/"));
    }

    #[tokio::test]
    async fn test_unloaded_model_answers_in_band() {
        let routes = routes(degraded_state());

        for path in ["/predict/", "/predict"] {
            let resp = request()
                .method("POST")
                .path(path)
                .json(&body())
                .reply(&routes)
                .await;

            assert_eq!(resp.status(), 200, "{}", path);
            let parsed: PredictResponse = serde_json::from_slice(resp.body()).unwrap();
            assert!(
                matches!(&parsed, PredictResponse::Error { error } if error.starts_with("Model not loaded")),
                "{:?}",
                parsed
            );
        }
    }

    #[tokio::test]
    async fn test_missing_field_is_422() {
        let mut incomplete = body();
        incomplete.as_object_mut().unwrap().remove("Lot_Area");

        let resp = request()
            .method("POST")
            .path("/predict/")
            .json(&incomplete)
            .reply(&routes(degraded_state()))
            .await;

        assert_eq!(resp.status(), 422);
        let parsed: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(parsed["detail"][0]["loc"], json!(["body", "Lot_Area"]));
        assert_eq!(parsed["detail"][0]["type"], json!("value_error.missing"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_422() {
        let resp = request()
            .method("POST")
            .path("/predict/")
            .header("content-type", "application/json")
            .body("{\"Gr_Liv_Area\": ")
            .reply(&routes(degraded_state()))
            .await;

        assert_eq!(resp.status(), 422);
    }

    #[tokio::test]
    async fn test_non_json_content_type_is_422() {
        let resp = request()
            .method("POST")
            .path("/predict/")
            .header("content-type", "text/plain")
            .body(body().to_string())
            .reply(&routes(degraded_state()))
            .await;

        assert_eq!(resp.status(), 422);
        let parsed: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(parsed["detail"][0]["loc"], json!(["body"]));
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let resp = request()
            .method("POST")
            .path("/predict/")
            .header("content-type", "application/json")
            .body(vec![b' '; MAX_BODY_BYTES as usize + 1])
            .reply(&routes(degraded_state()))
            .await;

        assert_eq!(resp.status(), 413);
    }

    #[tokio::test]
    async fn test_body_limit_without_length_passes() {
        assert!(request().filter(&body_limit()).await.is_ok());
        assert!(request()
            .header("content-length", "20000")
            .filter(&body_limit())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let resp = request()
            .method("GET")
            .path("/models")
            .reply(&routes(degraded_state()))
            .await;

        assert_eq!(resp.status(), 404);
    }
}
