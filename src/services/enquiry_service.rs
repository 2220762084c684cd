use crate::entities::enquiries;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use uuid::Uuid;

const SEARCH_COLUMNS: [enquiries::Column; 3] = [
    enquiries::Column::ChildName,
    enquiries::Column::Email,
    enquiries::Column::Mobile,
];

#[derive(Clone)]
pub struct EnquiryService {
    pool: DatabaseConnection,
}

impl EnquiryService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn submit(
        &self,
        request: CreateEnquiryRequest,
        submitted_by: Option<Uuid>,
    ) -> AppResult<enquiries::Model> {
        request.validate().into_result()?;

        let now = Utc::now();
        let enquiry = enquiries::ActiveModel {
            id: Set(Uuid::new_v4()),
            child_name: Set(request.child_name.trim().to_string()),
            grade: Set(request.grade),
            boarding_type: Set(request.boarding_type),
            email: Set(request.email.trim().to_lowercase()),
            mobile: Set(request.mobile.trim().to_string()),
            message: Set(request.message),
            submitted_by: Set(submitted_by),
            submitted_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Enquiry {} submitted", enquiry.id);
        Ok(enquiry)
    }

    fn filtered(search: Option<&str>) -> Select<enquiries::Entity> {
        let mut select = enquiries::Entity::find();
        if let Some(condition) = any_contains_ci(&SEARCH_COLUMNS, search) {
            select = select.filter(condition);
        }
        select.order_by_desc(enquiries::Column::SubmittedAt)
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<PaginatedResponse<EnquiryResponse>> {
        let params = query.pagination();
        let select = Self::filtered(query.search.as_deref());

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(items, &params, total).map(EnquiryResponse::from))
    }

    /// Whole filtered set, newest first, for export
    pub async fn find_all(&self, search: Option<&str>) -> AppResult<Vec<enquiries::Model>> {
        let items = Self::filtered(search).all(&self.pool).await?;
        Ok(items)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<enquiries::Model> {
        enquiries::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Enquiry not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = enquiries::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Enquiry not found".to_string()));
        }
        log::info!("Enquiry {id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::{create_pool, run_migrations};

    async fn service() -> EnquiryService {
        let pool = create_pool(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();
        EnquiryService::new(pool)
    }

    fn enquiry(child: &str, email: &str) -> CreateEnquiryRequest {
        CreateEnquiryRequest {
            child_name: child.to_string(),
            grade: "Grade 6".to_string(),
            boarding_type: "Day Scholar".to_string(),
            email: email.to_string(),
            mobile: "9876543210".to_string(),
            message: String::new(),
        }
    }

    #[tokio::test]
    async fn test_submit_lowercases_email() {
        let svc = service().await;
        let saved = svc.submit(enquiry("Rahul", "Rahul@Example.COM"), None).await.unwrap();
        assert_eq!(saved.email, "rahul@example.com");
        assert_eq!(svc.get(saved.id).await.unwrap().child_name, "Rahul");
    }

    #[tokio::test]
    async fn test_invalid_submit_is_rejected() {
        let svc = service().await;
        let result = svc.submit(enquiry("", "a@b.com"), None).await;
        assert!(matches!(result, Err(AppError::FieldErrors(_))));
    }

    #[tokio::test]
    async fn test_list_search_and_paging() {
        let svc = service().await;
        svc.submit(enquiry("Rahul", "a@b.com"), None).await.unwrap();
        svc.submit(enquiry("Meera", "meera@b.com"), None).await.unwrap();
        svc.submit(enquiry("Rahim", "c@d.com"), None).await.unwrap();

        let found = svc
            .list(&ListQuery {
                search: Some("RAH".to_string()),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(found.pagination.total, 2);

        let paged = svc
            .list(&ListQuery {
                page: Some(2),
                limit: Some(2),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.pagination.pages, 2);
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let svc = service().await;
        svc.submit(enquiry("Rahul", "a@b.com"), None).await.unwrap();

        let page = svc
            .list(&ListQuery {
                page: Some(u64::MAX),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let svc = service().await;
        let saved = svc.submit(enquiry("Rahul", "a@b.com"), None).await.unwrap();
        svc.delete(saved.id).await.unwrap();
        assert!(matches!(svc.delete(saved.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.get(saved.id).await, Err(AppError::NotFound(_))));
    }
}
