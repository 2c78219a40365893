use domain::platform::Platform;
use serde::Deserialize;
use utoipa::IntoParams;

/// Upper bound on snapshots returned by a single request.
pub(crate) const MAX_LIMIT: u64 = 500;

/// Query parameters for GET `/api/analytics`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// Restrict results to one platform.
    pub(crate) platform: Option<Platform>,
    /// Maximum number of snapshots, newest first. Capped at 500.
    pub(crate) limit: Option<u64>,
}

impl IndexParams {
    pub(crate) fn effective_limit(&self) -> u64 {
        self.limit.unwrap_or(MAX_LIMIT).min(MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_to_and_is_capped_at_max() {
        assert_eq!(IndexParams::default().effective_limit(), MAX_LIMIT);
        let params = IndexParams {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(params.effective_limit(), MAX_LIMIT);
        let params = IndexParams {
            limit: Some(7),
            ..Default::default()
        };
        assert_eq!(params.effective_limit(), 7);
    }
}
