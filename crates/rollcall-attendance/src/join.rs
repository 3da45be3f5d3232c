//! Join links: the URL a student follows to reach a session's claim
//! form. The session id is embedded verbatim as the last path segment.

use uuid::Uuid;

use crate::error::AttendanceError;

pub const JOIN_SEGMENT: &str = "attend";

pub fn build_join_link(base_url: &str, session_id: Uuid) -> String {
    format!(
        "{}/{JOIN_SEGMENT}/{}",
        base_url.trim_end_matches('/'),
        session_id.hyphenated()
    )
}

/// Recover the session id from a join link, a bare `/attend/<id>` path
/// or the id on its own.
pub fn extract_session_id(link: &str) -> Result<Uuid, AttendanceError> {
    let trimmed = link.trim();
    let path = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or_default();
    let parent = segments.next();

    if parent.is_some_and(|p| p != JOIN_SEGMENT) {
        return Err(AttendanceError::InvalidJoinLink(trimmed.to_string()));
    }
    Uuid::parse_str(last).map_err(|_| AttendanceError::InvalidJoinLink(trimmed.to_string()))
}
