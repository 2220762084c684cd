use crate::entities::enquiries;
use crate::utils::validation::{FieldErrors, has_exact_digits, is_valid_email};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEnquiryRequest {
    #[schema(example = "Rahul")]
    pub child_name: String,
    #[schema(example = "Grade 6")]
    pub grade: String,
    #[schema(example = "Day Scholar")]
    pub boarding_type: String,
    #[schema(example = "a@b.com")]
    pub email: String,
    #[schema(example = "9876543210")]
    pub mobile: String,
    pub message: String,
}

impl CreateEnquiryRequest {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("childName", &self.child_name, "Child's name is required");
        errors.require("grade", &self.grade, "Grade is required");
        errors.require(
            "boardingType",
            &self.boarding_type,
            "Boarding type is required",
        );
        if errors.require("email", &self.email, "Email is required") && !is_valid_email(&self.email)
        {
            errors.add("email", "Enter a valid email");
        }
        if errors.require("mobile", &self.mobile, "Mobile number is required")
            && !has_exact_digits(self.mobile.trim(), 10)
        {
            errors.add("mobile", "Mobile number must be 10 digits");
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryResponse {
    pub id: Uuid,
    pub child_name: String,
    pub grade: String,
    pub boarding_type: String,
    pub email: String,
    pub mobile: String,
    pub message: String,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<enquiries::Model> for EnquiryResponse {
    fn from(m: enquiries::Model) -> Self {
        Self {
            id: m.id,
            child_name: m.child_name,
            grade: m.grade,
            boarding_type: m.boarding_type,
            email: m.email,
            mobile: m.mobile,
            message: m.message,
            submitted_by: m.submitted_by,
            submitted_at: m.submitted_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryListResponse {
    pub items: Vec<EnquiryResponse>,
    pub pagination: crate::utils::PaginationInfo,
}
