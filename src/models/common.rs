use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    /// Field-keyed messages, present on form validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Query shared by list and export endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Case-insensitive substring
    pub search: Option<String>,
    /// Admissions only
    pub status: Option<String>,
    /// Admissions only
    pub board: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> crate::utils::PaginationParams {
        crate::utils::PaginationParams::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `admissions` (default) or `enquiries`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub board: Option<String>,
}

impl ExportQuery {
    pub fn filters(&self) -> ListQuery {
        ListQuery {
            page: None,
            limit: None,
            search: self.search.clone(),
            status: self.status.clone(),
            board: self.board.clone(),
        }
    }
}
