use thiserror::Error;

use crate::model::{ParseIdError, SettingsError, SnapshotError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    #[test]
    fn wraps_domain_errors_transparently() {
        let err: Error = SettingsError::InvalidExamSize.into();
        assert_eq!(err.to_string(), "exam size must be > 0");

        let err: Error = "x".parse::<QuestionId>().unwrap_err().into();
        assert!(matches!(err, Error::ParseId(_)));
    }
}
