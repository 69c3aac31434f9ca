//! Job id generation
//!
//! A job id is the first 8 hex characters of a fresh UUIDv4. It only
//! namespaces one request's output files, so uniqueness is probabilistic.

use std::fmt;
use uuid::Uuid;

/// Number of characters kept from the UUID
pub const JOB_ID_LEN: usize = 8;

/// Short random token identifying one extraction job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Generate a new job id
    pub fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(JOB_ID_LEN);
        Self(id)
    }

    /// Parse a job id, accepting only `JOB_ID_LEN` hex characters
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == JOB_ID_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix every artifact of this job starts with (`{id}_`)
    pub fn file_prefix(&self) -> String {
        format!("{}_", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_id_is_short_hex() {
        let id = JobId::generate();
        assert_eq!(id.as_str().len(), JOB_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id.as_str(), id.as_str().to_ascii_lowercase());
    }

    #[test]
    fn test_generated_ids_do_not_repeat() {
        let ids: HashSet<JobId> = (0..100).map(|_| JobId::generate()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_parse() {
        assert_eq!(JobId::parse("deadBEEF").unwrap().as_str(), "deadbeef");
        assert!(JobId::parse("deadbee").is_none());
        assert!(JobId::parse("deadbeeg").is_none());
        assert!(JobId::parse("../../../").is_none());
    }

    #[test]
    fn test_file_prefix() {
        let id = JobId::parse("0123abcd").unwrap();
        assert_eq!(id.file_prefix(), "0123abcd_");
        assert_eq!(id.to_string(), "0123abcd");
    }
}
