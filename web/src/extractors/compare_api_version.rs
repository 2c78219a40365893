use crate::extractors::RejectionType;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use log::*;
use semver::Version;
use service::config::ApiVersion;

/// Rejects REST requests whose `x-version` header is missing or names an
/// API version this server does not serve.
pub(crate) struct CompareApiVersion(pub Version);

#[async_trait]
impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let field_name = ApiVersion::field_name();

        let Some(header) = parts.headers.get(field_name) else {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Missing {field_name} header"),
            ));
        };

        let requested = header.to_str().map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("Malformed {field_name} header"),
            )
        })?;

        if !ApiVersion::versions().iter().any(|v| *v == requested) {
            debug!("Rejecting unsupported API version {requested}");
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported API version {requested}"),
            ));
        }

        let version = Version::parse(requested).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("Malformed {field_name} header"),
            )
        })?;

        Ok(CompareApiVersion(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(version: Option<&str>) -> Result<CompareApiVersion, RejectionType> {
        let mut builder = Request::builder().uri("/api/notifications");
        if let Some(version) = version {
            builder = builder.header(ApiVersion::field_name(), version);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CompareApiVersion::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn accepts_current_version() {
        let CompareApiVersion(version) = extract(Some(ApiVersion::default_version()))
            .await
            .unwrap();
        assert_eq!(version.to_string(), ApiVersion::default_version());
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let (status, _) = extract(None).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_unknown_version() {
        let (status, message) = extract(Some("9.9.9")).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("9.9.9"));
    }
}
