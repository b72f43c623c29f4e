use crate::gui_bridge::model::{ReadingSummary, ReadingsModel};
use crate::workflow::runner::Runner;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

/// Body of `POST /measure`.
#[derive(Debug, Deserialize)]
struct MeasureRequest {
    frequency: f64,
    duration: Option<f64>,
}

/// Bridge that hosts the readings HTTP endpoint and runs on-demand cycles.
pub struct GuiBridge {
    state: Arc<RwLock<ReadingsModel>>,
    runner: Arc<Runner>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ReadingsModel::default())),
            runner,
        }
    }

    /// `GET /readings` and `POST /measure`.
    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("readings")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<ReadingsModel>>| {
                let model = state.read().unwrap_or_else(|poisoned| poisoned.into_inner());
                warp::reply::json(&*model)
            });

        let measure_route = warp::path("measure")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |request: MeasureRequest,
                 state: Arc<RwLock<ReadingsModel>>,
                 runner: Arc<Runner>| async move {
                    let duration = request.duration.unwrap_or(runner.config().duration);
                    let metrics_runner = runner.clone();
                    let outcome = tokio::task::spawn_blocking(move || {
                        runner.measure_once(request.frequency, duration)
                    })
                    .await;
                    let reply = match outcome {
                        Ok(Ok(reading)) => {
                            let mut guard =
                                state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
                            guard.push(&reading);
                            guard.metrics = metrics_runner.metrics();
                            warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "reading": ReadingSummary::from(&reading),
                                })),
                                StatusCode::OK,
                            )
                        }
                        Ok(Err(err)) => {
                            warn!("measure error: {:#}", err);
                            warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "error",
                                    "message": format!("{err:#}"),
                                })),
                                StatusCode::BAD_REQUEST,
                            )
                        }
                        Err(err) => {
                            warn!("measure task failed: {}", err);
                            warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "error",
                                    "message": err.to_string(),
                                })),
                                StatusCode::INTERNAL_SERVER_ERROR,
                            )
                        }
                    };
                    Ok::<_, warp::Rejection>(reply)
                },
            );

        get_route.or(measure_route)
    }

    /// Serves [`routes`](Self::routes) on a background thread.
    pub fn spawn(&self, address: SocketAddr) -> Result<()> {
        let routes = self.routes();
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building bridge runtime")?;
        thread::spawn(move || {
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
        info!("readings bridge listening on {}", address);
        Ok(())
    }

    pub fn publish(&self, model: &ReadingsModel) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow::anyhow!("readings state poisoned"))?;
        *guard = model.clone();
        info!(
            "[GUI] readings: {}, cycles: {}",
            guard.readings.len(),
            guard.metrics.cycles
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> ReadingsModel {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;

    fn runner() -> Arc<Runner> {
        let mut cfg = WorkflowConfig::from_args(vec![40e3], 0.002, 1, 0, false);
        cfg.echo.noise = 0.0;
        Arc::new(Runner::new(cfg))
    }

    #[test]
    fn gui_bridge_updates_state() {
        let runner = runner();
        let gui = GuiBridge::new(runner.clone());
        let result = runner.execute().unwrap();
        gui.publish(&ReadingsModel::from_result(&result)).unwrap();
        let snapshot = gui.snapshot();
        assert_eq!(snapshot.readings.len(), 1);
        assert_eq!(snapshot.metrics.cycles, 1);
        assert_eq!(
            snapshot.latest_velocity(40e3),
            Some(result.readings[0].estimate.velocity)
        );
    }

    #[tokio::test]
    async fn measure_route_records_reading() {
        let gui = GuiBridge::new(runner());
        let routes = gui.routes();

        let response = warp::test::request()
            .method("POST")
            .path("/measure")
            .json(&json!({ "frequency": 40000.0 }))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = warp::test::request()
            .method("GET")
            .path("/readings")
            .reply(&routes)
            .await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["readings"][0]["frequency_hz"], 40000.0);
        assert_eq!(body["metrics"]["cycles"], 1);
    }

    #[tokio::test]
    async fn measure_route_rejects_invalid_sweep() {
        let gui = GuiBridge::new(runner());
        let response = warp::test::request()
            .method("POST")
            .path("/measure")
            .json(&json!({ "frequency": 1000.0 }))
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(gui.snapshot().readings.is_empty());
    }

    #[tokio::test]
    async fn measure_route_rejects_oversized_sweep() {
        let gui = GuiBridge::new(runner());
        let response = warp::test::request()
            .method("POST")
            .path("/measure")
            .json(&json!({ "frequency": 1e18, "duration": 1.0 }))
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert!(body["message"].as_str().unwrap().contains("exceed the limit"));
        assert!(gui.snapshot().readings.is_empty());
    }
}
