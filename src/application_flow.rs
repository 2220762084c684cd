//! Multi-step admission application.
//!
//! An application moves `student -> parent -> preview`. Moving forward is gated
//! by the current stage's validation, moving back never is. Leaving the preview
//! stage hands the complete form over for submission. Nothing here touches
//! storage: a saved draft is only a snapshot handed back to the caller.

use crate::entities::admissions::{Board, Sibling};
use crate::utils::validation::{
    FieldErrors, is_valid_aadhar, is_valid_email, is_valid_mobile, is_valid_pincode,
    parse_income_prefix,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Student,
    Parent,
    Preview,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Student, Step::Parent, Step::Preview];

    pub fn index(self) -> usize {
        match self {
            Step::Student => 0,
            Step::Parent => 1,
            Step::Preview => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Student => "Student details",
            Step::Parent => "Parent details",
            Step::Preview => "Preview",
        }
    }

    fn following(self) -> Option<Step> {
        match self {
            Step::Student => Some(Step::Parent),
            Step::Parent => Some(Step::Preview),
            Step::Preview => None,
        }
    }

    fn preceding(self) -> Step {
        match self {
            Step::Student | Step::Parent => Step::Student,
            Step::Preview => Step::Parent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Completed,
    Active,
    Upcoming,
}

/// The full application as posted by the form.
///
/// Missing keys fall back to the form's initial values. Photos are referenced by
/// the URLs returned from the upload endpoint; the older `studentPhoto` style
/// keys are accepted as a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationForm {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: String,
    pub grade: String,
    pub board: String,
    /// `YYYY-MM-DD`
    pub dob: String,
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
    #[serde(skip_serializing)]
    pub student_photo: Option<String>,
    #[serde(skip_serializing)]
    pub father_photo: Option<String>,
    #[serde(skip_serializing)]
    pub mother_photo: Option<String>,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            gender: String::new(),
            grade: String::new(),
            board: String::new(),
            dob: String::new(),
            birth_region: String::new(),
            birth_state: String::new(),
            nationality: String::new(),
            aadhar: String::new(),
            blood_group: String::new(),
            identification_marks: vec![String::new(), String::new()],
            correspondence_address: String::new(),
            area: String::new(),
            district: String::new(),
            state: String::new(),
            country: "India".to_string(),
            pincode: String::new(),
            same_permanent_address: true,
            permanent_address: String::new(),
            permanent_area: String::new(),
            permanent_district: String::new(),
            permanent_state: String::new(),
            permanent_country: "India".to_string(),
            permanent_pincode: String::new(),
            mother_tongue: String::new(),
            religion: String::new(),
            category: String::new(),
            caste: String::new(),
            sub_caste: String::new(),
            apaar_id: String::new(),
            family_structure: "Both With Parents".to_string(),
            siblings: Vec::new(),
            father_full_name: String::new(),
            father_mobile_code: "+91".to_string(),
            father_mobile: String::new(),
            father_email: String::new(),
            father_aadhar: String::new(),
            father_qualification: String::new(),
            father_profession: String::new(),
            mother_full_name: String::new(),
            mother_mobile_code: "+91".to_string(),
            mother_mobile: String::new(),
            mother_email: String::new(),
            mother_aadhar: String::new(),
            mother_qualification: String::new(),
            mother_profession: String::new(),
            gross_annual_income: String::new(),
            student_photo_url: None,
            father_photo_url: None,
            mother_photo_url: None,
            student_photo: None,
            father_photo: None,
            mother_photo: None,
        }
    }
}

fn first_present<'a>(primary: &'a Option<String>, fallback: &'a Option<String>) -> Option<&'a str> {
    [primary, fallback]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .map(str::trim)
        .find(|v| !v.is_empty())
}

impl ApplicationForm {
    pub fn student_photo(&self) -> Option<&str> {
        first_present(&self.student_photo_url, &self.student_photo)
    }

    pub fn father_photo(&self) -> Option<&str> {
        first_present(&self.father_photo_url, &self.father_photo)
    }

    pub fn mother_photo(&self) -> Option<&str> {
        first_present(&self.mother_photo_url, &self.mother_photo)
    }

    pub fn parsed_dob(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.dob.trim(), DATE_FORMAT).ok()
    }

    pub fn parsed_board(&self) -> Option<Board> {
        self.board.parse().ok()
    }

    fn has_identification_mark(&self) -> bool {
        self.identification_marks
            .iter()
            .take(2)
            .any(|m| !m.trim().is_empty())
    }
}

pub fn validate_student(form: &ApplicationForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    errors.require("firstName", &form.first_name, "First name is required");
    errors.require("lastName", &form.last_name, "Last name is required");
    errors.require("gender", &form.gender, "Gender is required");
    errors.require("grade", &form.grade, "Grade is required");
    if errors.require("board", &form.board, "Board/Curriculum is required")
        && form.parsed_board().is_none()
    {
        errors.add("board", "Board/Curriculum must be CBSE or IB");
    }
    if errors.require("dob", &form.dob, "Date of birth is required") && form.parsed_dob().is_none()
    {
        errors.add("dob", "Date of birth must be a valid date (YYYY-MM-DD)");
    }
    errors.require("birthState", &form.birth_state, "Birth state is required");
    errors.require("nationality", &form.nationality, "Nationality is required");
    if errors.require("aadhar", &form.aadhar, "Aadhar card number is required")
        && !is_valid_aadhar(&form.aadhar)
    {
        errors.add("aadhar", "Aadhar card number must be 12 digits");
    }
    errors.require("bloodGroup", &form.blood_group, "Blood group is required");
    if !form.has_identification_mark() {
        errors.add(
            "identificationMarks",
            "At least one identification mark is required",
        );
    }
    errors.require(
        "correspondenceAddress",
        &form.correspondence_address,
        "Correspondence address is required",
    );
    errors.require("area", &form.area, "Area is required");
    errors.require("district", &form.district, "District is required");
    errors.require("state", &form.state, "State is required");
    if errors.require("pincode", &form.pincode, "Pincode is required")
        && !is_valid_pincode(&form.pincode)
    {
        errors.add("pincode", "Pincode must be 6 digits");
    }
    errors.require("motherTongue", &form.mother_tongue, "Mother tongue is required");
    errors.require("religion", &form.religion, "Religion is required");
    errors.require("category", &form.category, "Category is required");
    if form.student_photo().is_none() {
        errors.add("studentPhoto", "Student photo is required");
    }

    if !form.same_permanent_address {
        errors.require(
            "permanentAddress",
            &form.permanent_address,
            "Permanent address is required",
        );
        errors.require("permanentArea", &form.permanent_area, "Permanent area is required");
        errors.require(
            "permanentDistrict",
            &form.permanent_district,
            "Permanent district is required",
        );
        errors.require(
            "permanentState",
            &form.permanent_state,
            "Permanent state is required",
        );
        if errors.require(
            "permanentPincode",
            &form.permanent_pincode,
            "Permanent pincode is required",
        ) && !is_valid_pincode(&form.permanent_pincode)
        {
            errors.add("permanentPincode", "Permanent pincode must be 6 digits");
        }
    }

    for (index, sibling) in form.siblings.iter().enumerate() {
        let incomplete = [&sibling.age, &sibling.institution, &sibling.standard]
            .iter()
            .any(|v| v.trim().is_empty());
        if !sibling.name.trim().is_empty() && incomplete {
            errors.add(
                format!("sibling_{index}"),
                "Please fill all sibling details or remove the entry",
            );
        }
    }

    errors
}

struct ParentFields<'a> {
    prefix: &'static str,
    title: &'static str,
    full_name: &'a str,
    mobile: &'a str,
    email: &'a str,
    aadhar: &'a str,
    qualification: &'a str,
    profession: &'a str,
    photo: Option<&'a str>,
}

fn validate_one_parent(errors: &mut FieldErrors, p: ParentFields<'_>) {
    let key = |suffix: &str| format!("{}{}", p.prefix, suffix);
    let title = p.title;

    errors.require(
        &key("FullName"),
        p.full_name,
        &format!("{title}'s full name is required"),
    );
    if errors.require(
        &key("Mobile"),
        p.mobile,
        &format!("{title}'s mobile number is required"),
    ) && !is_valid_mobile(p.mobile)
    {
        errors.add(key("Mobile"), "Mobile number must be 10 digits");
    }
    if errors.require(&key("Email"), p.email, &format!("{title}'s email is required"))
        && !is_valid_email(p.email)
    {
        errors.add(key("Email"), "Please enter a valid email address");
    }
    if errors.require(
        &key("Aadhar"),
        p.aadhar,
        &format!("{title}'s Aadhar card number is required"),
    ) && !is_valid_aadhar(p.aadhar)
    {
        errors.add(key("Aadhar"), "Aadhar card number must be 12 digits");
    }
    errors.require(
        &key("Qualification"),
        p.qualification,
        &format!("{title}'s qualification is required"),
    );
    errors.require(
        &key("Profession"),
        p.profession,
        &format!("{title}'s profession is required"),
    );
    if p.photo.is_none() {
        errors.add(key("Photo"), format!("{title}'s photo is required"));
    }
}

pub fn validate_parent(form: &ApplicationForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    validate_one_parent(
        &mut errors,
        ParentFields {
            prefix: "father",
            title: "Father",
            full_name: &form.father_full_name,
            mobile: &form.father_mobile,
            email: &form.father_email,
            aadhar: &form.father_aadhar,
            qualification: &form.father_qualification,
            profession: &form.father_profession,
            photo: form.father_photo(),
        },
    );
    validate_one_parent(
        &mut errors,
        ParentFields {
            prefix: "mother",
            title: "Mother",
            full_name: &form.mother_full_name,
            mobile: &form.mother_mobile,
            email: &form.mother_email,
            aadhar: &form.mother_aadhar,
            qualification: &form.mother_qualification,
            profession: &form.mother_profession,
            photo: form.mother_photo(),
        },
    );

    if errors.require(
        "grossAnnualIncome",
        &form.gross_annual_income,
        "Gross annual income is required",
    ) && !parse_income_prefix(&form.gross_annual_income).is_some_and(|n| n > 0)
    {
        errors.add("grossAnnualIncome", "Please enter a valid income amount");
    }

    errors
}

/// Validation for the stage being left. Preview has no fields of its own.
pub fn validate_stage(step: Step, form: &ApplicationForm) -> FieldErrors {
    match step {
        Step::Student => validate_student(form),
        Step::Parent => validate_parent(form),
        Step::Preview => FieldErrors::new(),
    }
}

/// Both stages, as checked before a submission is stored
pub fn validate_application(form: &ApplicationForm) -> FieldErrors {
    let mut errors = validate_student(form);
    errors.extend(validate_parent(form));
    errors
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Advanced(Step),
    Blocked { focus: String, errors: FieldErrors },
    ReadyToSubmit(Box<ApplicationForm>),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub step: Step,
    pub form: ApplicationForm,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ApplicationFlow {
    step: Step,
    form: ApplicationForm,
    errors: FieldErrors,
}

impl Default for ApplicationFlow {
    fn default() -> Self {
        Self::new(ApplicationForm::default())
    }
}

impl ApplicationFlow {
    pub fn new(form: ApplicationForm) -> Self {
        Self::at(Step::Student, form)
    }

    /// Resumes at an arbitrary stage, e.g. when a client reports where it is
    pub fn at(step: Step, form: ApplicationForm) -> Self {
        Self {
            step,
            form,
            errors: FieldErrors::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ApplicationForm {
        &mut self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn focus_field(&self) -> Option<&str> {
        self.errors.first_field()
    }

    pub fn next(&mut self) -> Transition {
        let errors = match self.step {
            Step::Preview => validate_application(&self.form),
            step => validate_stage(step, &self.form),
        };

        if let Some(focus) = errors.first_field().map(str::to_string) {
            self.errors = errors.clone();
            return Transition::Blocked { focus, errors };
        }

        self.errors = FieldErrors::new();
        match self.step.following() {
            Some(next) => {
                self.step = next;
                Transition::Advanced(next)
            }
            None => Transition::ReadyToSubmit(Box::new(self.form.clone())),
        }
    }

    pub fn previous(&mut self) -> Step {
        self.step = self.step.preceding();
        self.errors = FieldErrors::new();
        self.step
    }

    pub fn save_draft(&self) -> DraftSnapshot {
        DraftSnapshot {
            step: self.step,
            form: self.form.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn stage_status(&self, step: Step) -> StageStatus {
        match step.index().cmp(&self.step.index()) {
            std::cmp::Ordering::Less => StageStatus::Completed,
            std::cmp::Ordering::Equal => StageStatus::Active,
            std::cmp::Ordering::Greater => StageStatus::Upcoming,
        }
    }

    pub fn progress(&self) -> Vec<(Step, StageStatus)> {
        Step::ALL
            .iter()
            .map(|&s| (s, self.stage_status(s)))
            .collect()
    }
}
