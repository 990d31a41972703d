use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::DashboardError;

#[derive(Debug, Deserialize)]
struct CustomerParam {
    #[serde(rename = "customerId")]
    customer_id: Option<String>,
}

/// Optional `?customerId=` filter. Absent or empty means company-wide;
/// anything but a positive integer is rejected with 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerScope(pub Option<i64>);

impl CustomerScope {
    pub fn parse(raw: Option<&str>) -> Result<Self, DashboardError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self(None));
        };
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(Some(id))),
            _ => Err(DashboardError::bad_request("Invalid customer ID")),
        }
    }
}

impl<S> FromRequestParts<S> for CustomerScope
where
    S: Send + Sync,
{
    type Rejection = DashboardError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(param) = Query::<CustomerParam>::try_from_uri(&parts.uri)?;
        Self::parse(param.customer_id.as_deref())
    }
}
