use crate::models::Candidate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No team specified")]
    MissingTeam,
    #[error("Unknown team: {0}")]
    UnknownTeam(String),
}

/// Normalizes raw form input into a [`Candidate`].
///
/// Surrounding whitespace is ignored and the comparison is ASCII
/// case-insensitive, so `" tabs "` is accepted as `TABS`. Anything that is
/// not exactly one of the two names is rejected. This never touches I/O.
pub fn normalize_and_validate(input: &str) -> Result<Candidate, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingTeam);
    }

    Candidate::ALL
        .into_iter()
        .find(|candidate| trimmed.eq_ignore_ascii_case(candidate.as_str()))
        .ok_or_else(|| ValidationError::UnknownTeam(trimmed.to_string()))
}

/// Same as [`normalize_and_validate`] but treats an absent field as a
/// rejection, the way a form without `team` arrives.
pub fn validate_team(input: Option<&str>) -> Result<Candidate, ValidationError> {
    match input {
        Some(raw) => normalize_and_validate(raw),
        None => Err(ValidationError::MissingTeam),
    }
}
