#![allow(dead_code)]

use admissions_backend::config::*;
use admissions_backend::database::{DbPool, create_pool, run_migrations};
use admissions_backend::entities::users::UserRole;
use admissions_backend::{AppState, Config};
use serde_json::{Value, json};
use tempfile::TempDir;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@school.example";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

/// Builds the full application around a shared state, auth middleware included
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(admissions_backend::middlewares::AuthMiddleware::new(
                    $state.jwt_service.clone(),
                ))
                .configure(|cfg| $state.configure(cfg)),
        )
        .await
    };
}

pub struct TestContext {
    pub state: AppState,
    pub pool: DbPool,
    // kept alive for the duration of the test
    pub uploads: TempDir,
}

pub fn test_config(upload_dir: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        // a single connection, every new in-memory connection is a fresh database
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "integration-secret".to_string(),
            user_token_expires_in: 604_800,
            admin_token_expires_in: 86_400,
        },
        email: EmailConfig::default(),
        twilio: TwilioConfig::default(),
        uploads: UploadConfig {
            dir: upload_dir.to_string(),
            max_bytes: 5 * 1024 * 1024,
        },
        app: AppConfig {
            environment: "development".to_string(),
            public_url: "https://school.example".to_string(),
        },
    }
}

pub async fn setup() -> TestContext {
    let uploads = tempfile::tempdir().unwrap();
    let config = test_config(&uploads.path().to_string_lossy());

    let pool = create_pool(&config.database).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let state = AppState::new(&config, pool.clone()).unwrap();
    TestContext {
        state,
        pool,
        uploads,
    }
}

impl TestContext {
    pub fn user_token(&self) -> String {
        self.state
            .jwt_service
            .generate_token(Uuid::new_v4(), Some("parent@example.com"), UserRole::User)
            .unwrap()
            .token
    }

    /// Admin row with a cheap hash, plus a token for it
    pub async fn admin_token(&self) -> String {
        let admin = self
            .state
            .auth_service
            .create_admin_with_cost(ADMIN_EMAIL, ADMIN_PASSWORD, 4)
            .await
            .unwrap();
        self.state
            .jwt_service
            .generate_token(admin.id, admin.email.as_deref(), UserRole::Admin)
            .unwrap()
            .token
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn enquiry_body() -> Value {
    json!({
        "childName": "Rahul",
        "grade": "Grade 6",
        "boardingType": "Day Scholar",
        "email": "a@b.com",
        "mobile": "9876543210"
    })
}

/// Passes both the student and the parent stage
pub fn admission_body() -> Value {
    json!({
        "firstName": "Aarav",
        "lastName": "Sharma",
        "gender": "Male",
        "grade": "Grade 6",
        "board": "CBSE",
        "dob": "2014-05-17",
        "birthState": "Karnataka",
        "nationality": "Indian",
        "aadhar": "1234 5678 9012",
        "bloodGroup": "B+",
        "identificationMarks": ["Mole on left cheek", ""],
        "correspondenceAddress": "12 MG Road",
        "area": "Indiranagar",
        "district": "Bengaluru Urban",
        "state": "Karnataka",
        "pincode": "560038",
        "samePermanentAddress": true,
        "motherTongue": "Kannada",
        "religion": "Hindu",
        "category": "General",
        "studentPhotoUrl": "/uploads/students/1-abc.jpg",
        "fatherFullName": "Rohan Sharma",
        "fatherMobile": "9876543210",
        "fatherEmail": "Rohan@Example.com",
        "fatherAadhar": "123456789012",
        "fatherQualification": "B.Tech",
        "fatherProfession": "Engineer",
        "fatherPhotoUrl": "/uploads/fathers/1-abc.jpg",
        "motherFullName": "Priya Sharma",
        "motherMobile": "9876543211",
        "motherEmail": "priya@example.com",
        "motherAadhar": "210987654321",
        "motherQualification": "MBA",
        "motherProfession": "Consultant",
        "motherPhotoUrl": "/uploads/mothers/1-abc.jpg",
        "grossAnnualIncome": "1800000"
    })
}
