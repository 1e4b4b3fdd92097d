//! Leaderboard API for the minesweeper page, as a Cloudflare Worker over Workers KV.
//!
//! The page itself is served as static assets, this worker only answers `/api/leaderboard/{tier}`.

use js_sys::Date;
use minesweeper_protocol::{ApiResponse, ScoreRecord, Tier, parse_tier};
use serde::Serialize;
use time::OffsetDateTime;
use worker::*;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::routes::Action;
use crate::service::LeaderboardService;
use crate::store::KvScoreStore;

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;

#[event(start)]
fn start() {
    console_error_panic_hook::set_once();
    // a second init in the same isolate only fails, nothing to handle
    let _ = console_log::init_with_level(log::Level::Info);
}

#[event(fetch)]
pub async fn main(mut req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let path = req.path();
    let Some(tier_key) = routes::leaderboard_tier(&path) else {
        return Response::error("Not Found", 404);
    };
    let tier = match parse_tier(tier_key) {
        Ok(tier) => tier,
        Err(_) => return failure_response(&ServiceError::InvalidTier),
    };

    let action = Action::from(req.method());
    log::debug!("{:?} {}", action, tier);

    match action {
        Action::List => {
            let result = match open_service(&env) {
                Ok(service) => service.list(tier).await,
                Err(err) => Err(err),
            };
            records_response(result)
        }
        Action::Submit => {
            let result = match req.text().await {
                Ok(body) => handle_submit(&env, tier, &body).await,
                Err(err) => Err(service::body_unreadable(err)),
            };
            records_response(result)
        }
        Action::Preflight => {
            let headers = Headers::new();
            for (name, value) in routes::PREFLIGHT_HEADERS {
                headers.set(name, value)?;
            }
            Ok(Response::empty()?.with_status(204).with_headers(headers))
        }
        Action::NotAllowed => Response::error("Method not allowed", 405),
    }
}

async fn handle_submit(env: &Env, tier: Tier, body: &str) -> error::Result<Vec<ScoreRecord>> {
    let request = service::parse_submit(body)?;
    let service = open_service(env)?;
    service.submit(tier, request, now_utc()).await
}

fn open_service(env: &Env) -> error::Result<LeaderboardService<KvScoreStore>> {
    let config = ServiceConfig::from_env(env);
    let store = KvScoreStore::from_env(env, &config.kv_binding)?;
    Ok(LeaderboardService::new(store, config.policy))
}

fn now_utc() -> OffsetDateTime {
    let nanos = Date::now() as i128 * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn records_response(result: error::Result<Vec<ScoreRecord>>) -> Result<Response> {
    match result {
        Ok(records) => json_response(&ApiResponse::ok(records), 200),
        Err(err) => failure_response(&err),
    }
}

fn failure_response(err: &ServiceError) -> Result<Response> {
    if let ServiceError::StorageUnavailable(detail) = err {
        log::error!("Leaderboard storage failed: {}", detail);
    }
    json_response(&ApiResponse::<()>::failure(err.to_string()), err.status())
}

fn json_response<T: Serialize>(body: &ApiResponse<T>, status: u16) -> Result<Response> {
    let headers = Headers::new();
    headers.set("Content-Type", routes::JSON_CONTENT_TYPE)?;
    headers.set(routes::ALLOW_ORIGIN.0, routes::ALLOW_ORIGIN.1)?;
    Ok(Response::from_json(body)?.with_status(status).with_headers(headers))
}
