use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for GET `/api/notifications`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// Only return notifications that have not been read yet.
    #[serde(default)]
    pub(crate) unread_only: bool,
}
