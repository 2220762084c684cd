use crate::application_flow::{ApplicationFlow, ApplicationForm, StageStatus, Step, Transition};
use crate::entities::admissions::{self, AdmissionStatus, Board, Sibling};
use crate::utils::validation::FieldErrors;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAdmissionResponse {
    pub id: Uuid,
    #[schema(example = "DIS-2025-000001")]
    pub application_number: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[schema(example = "under-review")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateStageRequest {
    pub step: Step,
    #[serde(default)]
    pub form: ApplicationForm,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    pub step: Step,
    pub label: String,
    pub status: StageStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateStageResponse {
    pub valid: bool,
    /// Field-keyed messages in the order they were checked
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
    pub focus: Option<String>,
    /// Stage the client should show next
    pub step: Step,
    /// Set once the preview stage passes and the form can be posted
    pub ready_to_submit: bool,
    pub stages: Vec<StageProgress>,
}

impl ValidateStageResponse {
    /// Describes where the flow ended up after trying to advance
    pub fn from_flow(flow: &ApplicationFlow, transition: &Transition) -> Self {
        let stages = flow
            .progress()
            .into_iter()
            .map(|(step, status)| StageProgress {
                step,
                label: step.label().to_string(),
                status,
            })
            .collect();

        Self {
            valid: !matches!(transition, Transition::Blocked { .. }),
            errors: flow.errors().clone(),
            focus: flow.focus_field().map(str::to_string),
            step: flow.step(),
            ready_to_submit: matches!(transition, Transition::ReadyToSubmit(_)),
            stages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub id: Uuid,
    pub application_number: Option<String>,
    pub status: AdmissionStatus,

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
    pub identification_marks: Vec<String>,

    pub correspondence_address: String,
    pub area: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
    pub same_permanent_address: bool,
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
    pub siblings: Vec<Sibling>,

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

    pub submitted_by: Option<Uuid>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<admissions::Model> for AdmissionResponse {
    fn from(m: admissions::Model) -> Self {
        Self {
            id: m.id,
            application_number: m.application_number,
            status: m.status,
            first_name: m.first_name,
            middle_name: m.middle_name,
            last_name: m.last_name,
            gender: m.gender,
            grade: m.grade,
            board: m.board,
            dob: m.dob,
            birth_region: m.birth_region,
            birth_state: m.birth_state,
            nationality: m.nationality,
            aadhar: m.aadhar,
            blood_group: m.blood_group,
            identification_marks: m.identification_marks.0,
            correspondence_address: m.correspondence_address,
            area: m.area,
            district: m.district,
            state: m.state,
            country: m.country,
            pincode: m.pincode,
            same_permanent_address: m.same_permanent_address,
            permanent_address: m.permanent_address,
            permanent_area: m.permanent_area,
            permanent_district: m.permanent_district,
            permanent_state: m.permanent_state,
            permanent_country: m.permanent_country,
            permanent_pincode: m.permanent_pincode,
            mother_tongue: m.mother_tongue,
            religion: m.religion,
            category: m.category,
            caste: m.caste,
            sub_caste: m.sub_caste,
            apaar_id: m.apaar_id,
            family_structure: m.family_structure,
            siblings: m.siblings.0,
            father_full_name: m.father_full_name,
            father_mobile_code: m.father_mobile_code,
            father_mobile: m.father_mobile,
            father_email: m.father_email,
            father_aadhar: m.father_aadhar,
            father_qualification: m.father_qualification,
            father_profession: m.father_profession,
            mother_full_name: m.mother_full_name,
            mother_mobile_code: m.mother_mobile_code,
            mother_mobile: m.mother_mobile,
            mother_email: m.mother_email,
            mother_aadhar: m.mother_aadhar,
            mother_qualification: m.mother_qualification,
            mother_profession: m.mother_profession,
            gross_annual_income: m.gross_annual_income,
            student_photo_url: m.student_photo_url,
            father_photo_url: m.father_photo_url,
            mother_photo_url: m.mother_photo_url,
            submitted_by: m.submitted_by,
            submitted_at: m.submitted_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionListResponse {
    pub items: Vec<AdmissionResponse>,
    pub pagination: crate::utils::PaginationInfo,
}
