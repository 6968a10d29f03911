use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    /// Body of a failed request. The payload carries the machine-readable code.
    pub fn failure(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: Some(Meta::empty()),
        }
    }

    /// A declined confirmation. Still a successful response.
    pub fn cancelled(data: T) -> Self {
        Self::success("Cancelled", data, Some(Meta::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_serializes_camel_case() {
        let value = serde_json::to_value(Meta::new(2, 10, 31)).unwrap();
        assert_eq!(value, serde_json::json!({ "page": 2, "perPage": 10, "total": 31 }));
    }

    #[test]
    fn cancelled_reads_as_success() {
        let resp = ApiResponse::cancelled(serde_json::json!({ "removed": false }));
        assert_eq!(resp.message, "Cancelled");
        assert!(resp.data.is_some());
        assert!(resp.meta.is_some_and(|m| m.total.is_none()));
    }
}
