use rocket::http::Status;
use rocket::response::Responder;
use thiserror::Error;

use crate::config::ConfigError;
use crate::pool::PoolError;

pub const INVALID_TEAM_MESSAGE: &str = "Invalid team specified.";
pub const CAST_FAILED_MESSAGE: &str =
    "Unable to successfully cast vote! Please check the application logs for more details.";
pub const SUMMARY_FAILED_MESSAGE: &str =
    "Unable to retrieve voting data! Please check the application logs for more details.";

/// Conditions that stop the server from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Unable to verify table schema: {0}")]
    Schema(#[source] PoolError),
    #[error("Failed to launch server: {0}")]
    Launch(#[from] Box<rocket::Error>),
}

/// Errors the routes hand back to clients. Bodies are fixed strings so
/// database text never leaks into a response.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    #[error("{}", INVALID_TEAM_MESSAGE)]
    InvalidTeam,
    #[error("{}", CAST_FAILED_MESSAGE)]
    CastFailed,
    #[error("{}", SUMMARY_FAILED_MESSAGE)]
    SummaryUnavailable,
    #[error("Database unavailable")]
    DatabaseUnavailable,
}

impl ApiError {
    pub fn status(self) -> Status {
        match self {
            ApiError::InvalidTeam => Status::BadRequest,
            ApiError::CastFailed => Status::InternalServerError,
            ApiError::SummaryUnavailable => Status::InternalServerError,
            ApiError::DatabaseUnavailable => Status::ServiceUnavailable,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        rocket::Response::build_from(self.to_string().respond_to(req)?)
            .status(self.status())
            .ok()
    }
}
