use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};
use shared::models::{Candidate, Vote, VoteSummary, RECENT_VOTES_LIMIT};
use shared::validation::{validate_team, ValidationError};

use crate::pool::{PoolError, PoolManager};
use crate::queries::Queries;

#[derive(Debug, thiserror::Error)]
#[error("Unable to retrieve voting data")]
pub struct SummaryError(#[source] pub PoolError);

/// Outcome of a vote submission.
#[derive(Debug)]
pub enum CastResult {
    /// Input failed validation; nothing was stored.
    Rejected(ValidationError),
    /// Input was valid but the insert did not go through.
    Failed(PoolError),
    Succeeded(Vote),
}

pub struct VoteProcessor;

impl VoteProcessor {
    /// Vote counts for both sides plus the latest votes, read on one
    /// connection. All three reads must succeed.
    #[instrument(skip(pool))]
    pub async fn get_summary(pool: &PoolManager) -> Result<VoteSummary, SummaryError> {
        pool.with_connection(|conn| Box::pin(async move {
            let recent_votes = Queries::recent_votes(conn, RECENT_VOTES_LIMIT).await?;
            let tabs_count = Queries::count_for(conn, Candidate::Tabs).await?;
            let spaces_count = Queries::count_for(conn, Candidate::Spaces).await?;
            Ok(VoteSummary { tabs_count, spaces_count, recent_votes })
        }))
        .await
        .map_err(|e| {
            error!(operation = "get_summary", error = %e, "Unable to retrieve voting data");
            SummaryError(e)
        })
    }

    /// Validates `raw_team` and, if it names a side, stores one vote for it.
    ///
    /// Validation runs before anything touches the pool.
    #[instrument(skip(pool))]
    pub async fn cast_vote(pool: &PoolManager, raw_team: Option<&str>) -> CastResult {
        let candidate = match validate_team(raw_team) {
            Ok(candidate) => candidate,
            Err(e) => {
                debug!(reason = %e, "Rejected vote");
                return CastResult::Rejected(e);
            }
        };

        let cast_at = storage_precision(OffsetDateTime::now_utc());

        match pool
            .with_connection(move |conn| Box::pin(Queries::insert_vote(conn, candidate, cast_at)))
            .await
        {
            Ok(id) => {
                info!(vote_id = id, %candidate, "✓ Vote cast");
                CastResult::Succeeded(Vote { id, candidate, cast_at })
            }
            Err(e) => {
                warn!(
                    operation = "cast_vote",
                    %candidate,
                    error = %e,
                    retryable = e.is_transient(),
                    "Error while attempting to submit vote"
                );
                CastResult::Failed(e)
            }
        }
    }
}

/// Postgres keeps timestamps to the microsecond.
fn storage_precision(at: OffsetDateTime) -> OffsetDateTime {
    let micros = at.nanosecond() / 1_000 * 1_000;
    at.replace_nanosecond(micros).unwrap_or(at)
}
