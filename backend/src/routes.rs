use rocket::{State, get, post, FromForm, http::Status, form::{Errors, Form}, response::content::RawHtml, serde::json::Json};
use tracing::instrument;
use shared::{ErrorResponse, models::VoteSummary};

use crate::{
    error::ApiError,
    pool::PoolManager,
    processor::{CastResult, VoteProcessor},
    utils::format_timestamp,
    view::render_summary,
};

pub struct AppState {
    pub db: PoolManager,
}

impl AppState {
    pub fn new(db: PoolManager) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromForm)]
pub struct VoteForm {
    pub team: Option<String>,
}

#[get("/")]
pub async fn index(state: &State<AppState>) -> Result<RawHtml<String>, ApiError> {
    VoteProcessor::get_summary(&state.db)
        .await
        .map(|summary| RawHtml(render_summary(&summary)))
        .map_err(|_| ApiError::SummaryUnavailable)
}

fn cast_response(result: CastResult) -> Result<String, ApiError> {
    match result {
        CastResult::Succeeded(vote) => Ok(format!(
            "Vote successfully cast for '{}' at time {}!\n",
            vote.candidate,
            format_timestamp(vote.cast_at)
        )),
        CastResult::Rejected(_) => Err(ApiError::InvalidTeam),
        CastResult::Failed(_) => Err(ApiError::CastFailed),
    }
}

#[instrument(skip(state, form))]
#[post("/?<team>", data = "<form>")]
pub async fn cast_vote(
    state: &State<AppState>,
    team: Option<String>,
    form: Result<Form<VoteForm>, Errors<'_>>,
) -> Result<String, ApiError> {
    // A body that does not parse as a form carries no usable team; the query
    // string is consulted only when the form has none.
    let team = form.ok().and_then(|form| form.into_inner().team).or(team);
    cast_response(VoteProcessor::cast_vote(&state.db, team.as_deref()).await)
}

/// Posts without a form body: the team can only come from the query string.
#[instrument(skip(state))]
#[post("/?<team>", rank = 2)]
pub async fn cast_vote_query(state: &State<AppState>, team: Option<String>) -> Result<String, ApiError> {
    cast_response(VoteProcessor::cast_vote(&state.db, team.as_deref()).await)
}

#[get("/api/summary")]
pub async fn summary(state: &State<AppState>) -> Result<Json<VoteSummary>, (Status, Json<ErrorResponse>)> {
    VoteProcessor::get_summary(&state.db)
        .await
        .map(Json)
        .map_err(|e| (Status::InternalServerError, Json(ErrorResponse::new(e.to_string()))))
}

#[get("/health")]
pub async fn health(state: &State<AppState>) -> Result<&'static str, ApiError> {
    state
        .db
        .health_check()
        .await
        .map(|_| "ok")
        .map_err(|_| ApiError::DatabaseUnavailable)
}
