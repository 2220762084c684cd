use crate::application_flow::{ApplicationForm, validate_application};
use crate::database::is_unique_violation;
use crate::entities::admissions::{self, AdmissionStatus, Board, SiblingList, StringList};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

pub const APPLICATION_NUMBER_PREFIX: &str = "DIS";
const MAX_NUMBER_ATTEMPTS: usize = 5;

const SEARCH_COLUMNS: [admissions::Column; 5] = [
    admissions::Column::FirstName,
    admissions::Column::LastName,
    admissions::Column::FatherEmail,
    admissions::Column::MotherEmail,
    admissions::Column::ApplicationNumber,
];

/// `DIS-<year>-<6 digit sequence>`
pub fn format_application_number(year: i32, sequence: u32) -> String {
    format!("{APPLICATION_NUMBER_PREFIX}-{year}-{sequence:06}")
}

fn application_number_prefix(year: i32) -> String {
    format!("{APPLICATION_NUMBER_PREFIX}-{year}-")
}

fn parse_sequence(number: &str, prefix: &str) -> Option<u32> {
    number.strip_prefix(prefix)?.parse().ok()
}

#[derive(Clone)]
pub struct AdmissionService {
    pool: DatabaseConnection,
}

impl AdmissionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// One more than the highest number issued this year
    async fn next_application_number(&self, year: i32) -> AppResult<String> {
        let prefix = application_number_prefix(year);
        let latest = admissions::Entity::find()
            .filter(admissions::Column::ApplicationNumber.starts_with(&prefix))
            .order_by_desc(admissions::Column::ApplicationNumber)
            .one(&self.pool)
            .await?;

        let last = latest
            .and_then(|m| m.application_number)
            .and_then(|n| parse_sequence(&n, &prefix))
            .unwrap_or(0);

        Ok(format_application_number(year, last + 1))
    }

    pub async fn submit(
        &self,
        form: ApplicationForm,
        submitted_by: Option<Uuid>,
    ) -> AppResult<SubmitAdmissionResponse> {
        validate_application(&form).into_result()?;

        let board = form.parsed_board().ok_or_else(|| {
            AppError::ValidationError("Board/Curriculum must be CBSE or IB".to_string())
        })?;
        let dob = form.parsed_dob().ok_or_else(|| {
            AppError::ValidationError("Date of birth must be a valid date".to_string())
        })?;

        let now = Utc::now();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let number = self.next_application_number(now.year()).await?;
            let record = new_admission(&form, board, dob, &number, submitted_by, now);

            match record.insert(&self.pool).await {
                Ok(saved) => {
                    log::info!("Admission {} submitted as {}", saved.id, number);
                    return Ok(SubmitAdmissionResponse {
                        id: saved.id,
                        application_number: number,
                    });
                }
                // a concurrent submit took the same number
                Err(e) if is_unique_violation(&e) && attempt < MAX_NUMBER_ATTEMPTS => {
                    log::warn!("Application number {number} already taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn filtered(query: &ListQuery) -> AppResult<Select<admissions::Entity>> {
        let mut select = admissions::Entity::find();

        if let Some(condition) = any_contains_ci(&SEARCH_COLUMNS, query.search.as_deref()) {
            select = select.filter(condition);
        }
        if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
            let status: AdmissionStatus = status.parse().map_err(AppError::ValidationError)?;
            select = select.filter(admissions::Column::Status.eq(status));
        }
        if let Some(board) = query.board.as_deref().filter(|s| !s.is_empty()) {
            let board: Board = board.parse().map_err(AppError::ValidationError)?;
            select = select.filter(admissions::Column::Board.eq(board));
        }

        Ok(select.order_by_desc(admissions::Column::SubmittedAt))
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<PaginatedResponse<AdmissionResponse>> {
        let params = query.pagination();
        let select = Self::filtered(query)?;

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(items, &params, total).map(AdmissionResponse::from))
    }

    /// Whole filtered set, ignoring paging, for export
    pub async fn find_all(&self, query: &ListQuery) -> AppResult<Vec<admissions::Model>> {
        let items = Self::filtered(query)?.all(&self.pool).await?;
        Ok(items)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<AdmissionResponse>> {
        let items = admissions::Entity::find()
            .filter(admissions::Column::SubmittedBy.eq(user_id))
            .order_by_desc(admissions::Column::SubmittedAt)
            .all(&self.pool)
            .await?;
        Ok(items.into_iter().map(AdmissionResponse::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<admissions::Model> {
        admissions::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Admission not found".to_string()))
    }

    pub async fn update_status(&self, id: Uuid, status: &str) -> AppResult<admissions::Model> {
        let status: AdmissionStatus = status.parse().map_err(|_| {
            AppError::ValidationError(
                "Invalid status. Must be one of: draft, submitted, under-review, accepted, rejected"
                    .to_string(),
            )
        })?;

        let mut active: admissions::ActiveModel = self.get(id).await?.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.pool).await?;

        log::info!("Admission {id} moved to {status}");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = admissions::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Admission not found".to_string()));
        }
        log::info!("Admission {id} deleted");
        Ok(())
    }
}

fn photo(url: Option<&str>) -> Option<String> {
    url.map(str::to_string)
}

fn new_admission(
    form: &ApplicationForm,
    board: Board,
    dob: NaiveDate,
    number: &str,
    submitted_by: Option<Uuid>,
    now: DateTime<Utc>,
) -> admissions::ActiveModel {
    let f = form.clone();
    admissions::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(f.first_name.trim().to_string()),
        middle_name: Set(f.middle_name.trim().to_string()),
        last_name: Set(f.last_name.trim().to_string()),
        gender: Set(f.gender),
        grade: Set(f.grade),
        board: Set(board),
        dob: Set(dob),
        birth_region: Set(f.birth_region),
        birth_state: Set(f.birth_state),
        nationality: Set(f.nationality),
        aadhar: Set(f.aadhar),
        blood_group: Set(f.blood_group),
        identification_marks: Set(StringList(f.identification_marks)),
        correspondence_address: Set(f.correspondence_address),
        area: Set(f.area),
        district: Set(f.district),
        state: Set(f.state),
        country: Set(f.country),
        pincode: Set(f.pincode),
        same_permanent_address: Set(f.same_permanent_address),
        permanent_address: Set(f.permanent_address),
        permanent_area: Set(f.permanent_area),
        permanent_district: Set(f.permanent_district),
        permanent_state: Set(f.permanent_state),
        permanent_country: Set(f.permanent_country),
        permanent_pincode: Set(f.permanent_pincode),
        mother_tongue: Set(f.mother_tongue),
        religion: Set(f.religion),
        category: Set(f.category),
        caste: Set(f.caste),
        sub_caste: Set(f.sub_caste),
        apaar_id: Set(f.apaar_id),
        family_structure: Set(f.family_structure),
        siblings: Set(SiblingList(f.siblings)),
        father_full_name: Set(f.father_full_name),
        father_mobile_code: Set(f.father_mobile_code),
        father_mobile: Set(f.father_mobile),
        father_email: Set(f.father_email.trim().to_lowercase()),
        father_aadhar: Set(f.father_aadhar),
        father_qualification: Set(f.father_qualification),
        father_profession: Set(f.father_profession),
        mother_full_name: Set(f.mother_full_name),
        mother_mobile_code: Set(f.mother_mobile_code),
        mother_mobile: Set(f.mother_mobile),
        mother_email: Set(f.mother_email.trim().to_lowercase()),
        mother_aadhar: Set(f.mother_aadhar),
        mother_qualification: Set(f.mother_qualification),
        mother_profession: Set(f.mother_profession),
        gross_annual_income: Set(f.gross_annual_income),
        student_photo_url: Set(photo(form.student_photo())),
        father_photo_url: Set(photo(form.father_photo())),
        mother_photo_url: Set(photo(form.mother_photo())),
        status: Set(AdmissionStatus::Submitted),
        application_number: Set(Some(number.to_string())),
        submitted_by: Set(submitted_by),
        submitted_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_flow::tests::complete_form;
    use crate::config::DatabaseConfig;
    use crate::database::{create_pool, run_migrations};
    use regex::Regex;
    use std::collections::HashSet;

    async fn service() -> AdmissionService {
        let pool = create_pool(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();
        AdmissionService::new(pool)
    }

    #[test]
    fn test_number_format() {
        assert_eq!(format_application_number(2025, 7), "DIS-2025-000007");
        assert_eq!(parse_sequence("DIS-2025-000042", "DIS-2025-"), Some(42));
        assert_eq!(parse_sequence("DIS-2024-000042", "DIS-2025-"), None);
    }

    #[tokio::test]
    async fn test_numbers_are_sequential_and_unique() {
        let svc = service().await;
        let pattern = Regex::new(r"^DIS-\d{4}-\d{6}$").unwrap();
        let year = Utc::now().year();

        let mut seen = HashSet::new();
        for i in 1..=3u32 {
            let mut form = complete_form();
            if i == 2 {
                form.board = "IB".to_string();
            }
            let saved = svc.submit(form, None).await.unwrap();
            assert!(pattern.is_match(&saved.application_number));
            assert_eq!(saved.application_number, format_application_number(year, i));
            assert!(seen.insert(saved.application_number));
        }

        let stored = svc.get(svc.list(&ListQuery::default()).await.unwrap().items[0].id)
            .await
            .unwrap();
        assert_eq!(stored.status, AdmissionStatus::Submitted);
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_stored() {
        let svc = service().await;
        let mut form = complete_form();
        form.father_email = "not-an-email".to_string();

        match svc.submit(form, None).await {
            Err(AppError::FieldErrors(errors)) => {
                assert_eq!(errors.first_field(), Some("fatherEmail"))
            }
            other => panic!("unexpected result {other:?}"),
        }
        let all = svc.list(&ListQuery::default()).await.unwrap();
        assert_eq!(all.pagination.total, 0);
    }

    #[tokio::test]
    async fn test_filters() {
        let svc = service().await;
        let user = Uuid::new_v4();
        svc.submit(complete_form(), Some(user)).await.unwrap();
        let mut ib = complete_form();
        ib.board = "IB".to_string();
        ib.first_name = "Kavya".to_string();
        let ib_saved = svc.submit(ib, None).await.unwrap();

        let by_board = svc
            .list(&ListQuery {
                board: Some("IB".to_string()),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(by_board.pagination.total, 1);
        assert_eq!(by_board.items[0].id, ib_saved.id);

        let by_search = svc
            .list(&ListQuery {
                search: Some(ib_saved.application_number.to_lowercase()),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.items.len(), 1);

        let by_email = svc
            .find_all(&ListQuery {
                search: Some("ROHAN@".to_string()),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(by_email.len(), 2);

        let bad = svc
            .list(&ListQuery {
                status: Some("approved".to_string()),
                ..ListQuery::default()
            })
            .await;
        assert!(matches!(bad, Err(AppError::ValidationError(_))));

        let mine = svc.list_for_user(user).await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_status_update_and_delete() {
        let svc = service().await;
        let saved = svc.submit(complete_form(), None).await.unwrap();

        let updated = svc.update_status(saved.id, "under-review").await.unwrap();
        assert_eq!(updated.status, AdmissionStatus::UnderReview);

        let filtered = svc
            .list(&ListQuery {
                status: Some("under-review".to_string()),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.pagination.total, 1);

        assert!(matches!(
            svc.update_status(saved.id, "approved").await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            svc.update_status(Uuid::new_v4(), "accepted").await,
            Err(AppError::NotFound(_))
        ));

        svc.delete(saved.id).await.unwrap();
        assert!(matches!(svc.get(saved.id).await, Err(AppError::NotFound(_))));
    }
}
