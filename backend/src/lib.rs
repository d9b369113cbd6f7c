pub mod catchers;
pub mod config;
pub mod error;
pub mod pool;
pub mod processor;
pub mod queries;
pub mod routes;
pub mod utils;
pub mod view;

pub use shared::{models::*, validation::*, ErrorResponse};

use rocket::{Build, Rocket, catchers, fairing::AdHoc, routes};
use tracing::info;

use crate::catchers::{bad_request, internal_error, not_found, unprocessable};
use crate::routes::{cast_vote, cast_vote_query, health, index, summary, AppState};

/// Assembles the server around an already initialised pool.
///
/// The pool is closed once, by the shutdown fairing, when Rocket stops.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .attach(AdHoc::on_shutdown("Close connection pool", |rocket| {
            Box::pin(async move {
                if let Some(state) = rocket.state::<AppState>() {
                    info!("🛑 Shutting down, draining connection pool");
                    state.db.shutdown().await;
                }
            })
        }))
        .mount("/", routes![index, cast_vote, cast_vote_query, summary, health])
        .register("/", catchers![bad_request, not_found, unprocessable, internal_error])
}
