use sqlx::postgres::PgConnection;
use time::{OffsetDateTime, PrimitiveDateTime};
use shared::models::{Candidate, Vote};

pub const CREATE_VOTES_TABLE: &str = "CREATE TABLE IF NOT EXISTS votes (
    vote_id SERIAL NOT NULL,
    time_cast TIMESTAMP NOT NULL,
    candidate CHAR(6) NOT NULL,
    PRIMARY KEY (vote_id)
)";

pub struct Queries;

impl Queries {
    pub async fn create_votes_table(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_VOTES_TABLE).execute(&mut *conn).await?;
        Ok(())
    }

    pub async fn ping(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }

    /// Most recent votes first. Equal timestamps fall back to insertion order.
    pub async fn recent_votes(conn: &mut PgConnection, limit: i64) -> Result<Vec<Vote>, sqlx::Error> {
        let rows: Vec<(i32, String, PrimitiveDateTime)> = sqlx::query_as(
            "SELECT vote_id, candidate, time_cast FROM votes
             ORDER BY time_cast DESC, vote_id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter()
            .map(|(id, candidate, time_cast)| -> Result<Vote, sqlx::Error> {
                let candidate = candidate
                    .parse::<Candidate>()
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                Ok(Vote {
                    id,
                    candidate,
                    cast_at: time_cast.assume_utc(),
                })
            })
            .collect()
    }

    pub async fn count_for(conn: &mut PgConnection, candidate: Candidate) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(vote_id) FROM votes WHERE candidate = $1")
            .bind(candidate.as_str())
            .fetch_one(&mut *conn)
            .await
    }

    /// Inserts one vote and returns the id storage assigned to it.
    pub async fn insert_vote(
        conn: &mut PgConnection,
        candidate: Candidate,
        cast_at: OffsetDateTime,
    ) -> Result<i32, sqlx::Error> {
        let utc = cast_at.to_offset(time::UtcOffset::UTC);
        sqlx::query_scalar(
            "INSERT INTO votes (time_cast, candidate) VALUES ($1, $2) RETURNING vote_id",
        )
        .bind(PrimitiveDateTime::new(utc.date(), utc.time()))
        .bind(candidate.as_str())
        .fetch_one(&mut *conn)
        .await
    }
}
