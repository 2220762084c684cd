use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(8))")]
#[allow(clippy::upper_case_acronyms)]
pub enum Board {
    #[sea_orm(string_value = "CBSE")]
    CBSE,
    #[sea_orm(string_value = "IB")]
    IB,
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Board::CBSE => write!(f, "CBSE"),
            Board::IB => write!(f, "IB"),
        }
    }
}

impl FromStr for Board {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CBSE" => Ok(Board::CBSE),
            "IB" => Ok(Board::IB),
            other => Err(format!("Unknown board: {other}")),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "kebab-case")]
pub enum AdmissionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "under-review")]
    UnderReview,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl AdmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionStatus::Draft => "draft",
            AdmissionStatus::Submitted => "submitted",
            AdmissionStatus::UnderReview => "under-review",
            AdmissionStatus::Accepted => "accepted",
            AdmissionStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AdmissionStatus::Draft),
            "submitted" => Ok(AdmissionStatus::Submitted),
            "under-review" => Ok(AdmissionStatus::UnderReview),
            "accepted" => Ok(AdmissionStatus::Accepted),
            "rejected" => Ok(AdmissionStatus::Rejected),
            other => Err(format!("Invalid status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Sibling {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub standard: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SiblingList(pub Vec<Sibling>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "admissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: String,
    pub grade: String,
    pub board: Board,
    pub dob: NaiveDate,
    pub birth_region: String,
    pub birth_state: String,
    pub nationality: String,
    pub aadhar: String,
    pub blood_group: String,
    #[sea_orm(column_type = "Json")]
    pub identification_marks: StringList,

    #[sea_orm(column_type = "Text")]
    pub correspondence_address: String,
    pub area: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
    pub same_permanent_address: bool,
    #[sea_orm(column_type = "Text")]
    pub permanent_address: String,
    pub permanent_area: String,
    pub permanent_district: String,
    pub permanent_state: String,
    pub permanent_country: String,
    pub permanent_pincode: String,

    pub mother_tongue: String,
    pub religion: String,
    pub category: String,
    pub caste: String,
    pub sub_caste: String,
    pub apaar_id: String,
    pub family_structure: String,
    #[sea_orm(column_type = "Json")]
    pub siblings: SiblingList,

    pub father_full_name: String,
    pub father_mobile_code: String,
    pub father_mobile: String,
    pub father_email: String,
    pub father_aadhar: String,
    pub father_qualification: String,
    pub father_profession: String,
    pub mother_full_name: String,
    pub mother_mobile_code: String,
    pub mother_mobile: String,
    pub mother_email: String,
    pub mother_aadhar: String,
    pub mother_qualification: String,
    pub mother_profession: String,
    pub gross_annual_income: String,

    pub student_photo_url: Option<String>,
    pub father_photo_url: Option<String>,
    pub mother_photo_url: Option<String>,

    pub status: AdmissionStatus,
    #[sea_orm(unique)]
    pub application_number: Option<String>,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
