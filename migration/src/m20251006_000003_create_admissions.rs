use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Admissions {
    Table,
    Id,
    // student
    FirstName,
    MiddleName,
    LastName,
    Gender,
    Grade,
    Board,
    Dob,
    BirthRegion,
    BirthState,
    Nationality,
    Aadhar,
    BloodGroup,
    IdentificationMarks,
    // address
    CorrespondenceAddress,
    Area,
    District,
    State,
    Country,
    Pincode,
    SamePermanentAddress,
    PermanentAddress,
    PermanentArea,
    PermanentDistrict,
    PermanentState,
    PermanentCountry,
    PermanentPincode,
    // additional
    MotherTongue,
    Religion,
    Category,
    Caste,
    SubCaste,
    ApaarId,
    FamilyStructure,
    Siblings,
    // parents
    FatherFullName,
    FatherMobileCode,
    FatherMobile,
    FatherEmail,
    FatherAadhar,
    FatherQualification,
    FatherProfession,
    MotherFullName,
    MotherMobileCode,
    MotherMobile,
    MotherEmail,
    MotherAadhar,
    MotherQualification,
    MotherProfession,
    GrossAnnualIncome,
    // photos
    StudentPhotoUrl,
    FatherPhotoUrl,
    MotherPhotoUrl,
    // metadata
    Status,
    ApplicationNumber,
    SubmittedBy,
    SubmittedAt,
    CreatedAt,
    UpdatedAt,
}

fn text(col: Admissions) -> ColumnDef {
    ColumnDef::new(col)
        .string_len(255)
        .not_null()
        .default("")
        .to_owned()
}

fn short_text(col: Admissions, len: u32) -> ColumnDef {
    ColumnDef::new(col)
        .string_len(len)
        .not_null()
        .default("")
        .to_owned()
}

fn timestamp(col: Admissions) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Admissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(&mut text(Admissions::FirstName))
                    .col(&mut text(Admissions::MiddleName))
                    .col(&mut text(Admissions::LastName))
                    .col(&mut short_text(Admissions::Gender, 32))
                    .col(&mut short_text(Admissions::Grade, 32))
                    .col(&mut short_text(Admissions::Board, 8))
                    .col(ColumnDef::new(Admissions::Dob).date().not_null())
                    .col(&mut text(Admissions::BirthRegion))
                    .col(&mut text(Admissions::BirthState))
                    .col(&mut short_text(Admissions::Nationality, 64))
                    .col(&mut short_text(Admissions::Aadhar, 16))
                    .col(&mut short_text(Admissions::BloodGroup, 8))
                    .col(ColumnDef::new(Admissions::IdentificationMarks).json().not_null())
                    .col(ColumnDef::new(Admissions::CorrespondenceAddress).text().not_null())
                    .col(&mut text(Admissions::Area))
                    .col(&mut text(Admissions::District))
                    .col(&mut text(Admissions::State))
                    .col(&mut text(Admissions::Country))
                    .col(&mut short_text(Admissions::Pincode, 8))
                    .col(
                        ColumnDef::new(Admissions::SamePermanentAddress)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Admissions::PermanentAddress)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(&mut text(Admissions::PermanentArea))
                    .col(&mut text(Admissions::PermanentDistrict))
                    .col(&mut text(Admissions::PermanentState))
                    .col(&mut text(Admissions::PermanentCountry))
                    .col(&mut short_text(Admissions::PermanentPincode, 8))
                    .col(&mut text(Admissions::MotherTongue))
                    .col(&mut short_text(Admissions::Religion, 64))
                    .col(&mut short_text(Admissions::Category, 64))
                    .col(&mut text(Admissions::Caste))
                    .col(&mut text(Admissions::SubCaste))
                    .col(&mut short_text(Admissions::ApaarId, 64))
                    .col(&mut short_text(Admissions::FamilyStructure, 64))
                    .col(ColumnDef::new(Admissions::Siblings).json().not_null())
                    .col(&mut text(Admissions::FatherFullName))
                    .col(&mut short_text(Admissions::FatherMobileCode, 8))
                    .col(&mut short_text(Admissions::FatherMobile, 16))
                    .col(&mut text(Admissions::FatherEmail))
                    .col(&mut short_text(Admissions::FatherAadhar, 16))
                    .col(&mut text(Admissions::FatherQualification))
                    .col(&mut text(Admissions::FatherProfession))
                    .col(&mut text(Admissions::MotherFullName))
                    .col(&mut short_text(Admissions::MotherMobileCode, 8))
                    .col(&mut short_text(Admissions::MotherMobile, 16))
                    .col(&mut text(Admissions::MotherEmail))
                    .col(&mut short_text(Admissions::MotherAadhar, 16))
                    .col(&mut text(Admissions::MotherQualification))
                    .col(&mut text(Admissions::MotherProfession))
                    .col(&mut short_text(Admissions::GrossAnnualIncome, 64))
                    .col(ColumnDef::new(Admissions::StudentPhotoUrl).string_len(512).null())
                    .col(ColumnDef::new(Admissions::FatherPhotoUrl).string_len(512).null())
                    .col(ColumnDef::new(Admissions::MotherPhotoUrl).string_len(512).null())
                    .col(
                        ColumnDef::new(Admissions::Status)
                            .string_len(16)
                            .not_null()
                            .default("submitted"),
                    )
                    .col(
                        ColumnDef::new(Admissions::ApplicationNumber)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(Admissions::SubmittedBy).uuid().null())
                    .col(&mut timestamp(Admissions::SubmittedAt))
                    .col(&mut timestamp(Admissions::CreatedAt))
                    .col(&mut timestamp(Admissions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // sparse uniqueness: drafts carry no number
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admissions_application_number_unique")
                    .table(Admissions::Table)
                    .col(Admissions::ApplicationNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admissions_status_submitted_at")
                    .table(Admissions::Table)
                    .col(Admissions::Status)
                    .col(Admissions::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admissions_board_grade")
                    .table(Admissions::Table)
                    .col(Admissions::Board)
                    .col(Admissions::Grade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admissions_submitted_by")
                    .table(Admissions::Table)
                    .col(Admissions::SubmittedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Admissions::Table).if_exists().to_owned())
            .await
    }
}
