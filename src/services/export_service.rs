use crate::entities::{admissions, enquiries};
use crate::error::{AppError, AppResult};
use crate::models::ListQuery;
use crate::services::{AdmissionService, EnquiryService};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, Worksheet};
use std::str::FromStr;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADER_BACKGROUND: u32 = 0x1C2C5B;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Admissions,
    Enquiries,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Admissions => "admissions",
            ExportKind::Enquiries => "enquiries",
        }
    }
}

impl FromStr for ExportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admissions" => Ok(ExportKind::Admissions),
            "enquiries" => Ok(ExportKind::Enquiries),
            _ => Err(AppError::ValidationError(
                "Export type must be admissions or enquiries".to_string(),
            )),
        }
    }
}

#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// (header, column width)
const ADMISSION_COLUMNS: [(&str, f64); 17] = [
    ("Application Number", 20.0),
    ("First Name", 15.0),
    ("Middle Name", 15.0),
    ("Last Name", 15.0),
    ("Grade", 10.0),
    ("Board", 10.0),
    ("Date of Birth", 15.0),
    ("Gender", 10.0),
    ("Father Email", 30.0),
    ("Father Mobile", 15.0),
    ("Mother Email", 30.0),
    ("Mother Mobile", 15.0),
    ("Student Photo URL", 60.0),
    ("Father Photo URL", 60.0),
    ("Mother Photo URL", 60.0),
    ("Status", 15.0),
    ("Submitted At", 20.0),
];

const ENQUIRY_COLUMNS: [(&str, f64); 7] = [
    ("Child Name", 25.0),
    ("Grade", 15.0),
    ("Boarding Type", 15.0),
    ("Email", 30.0),
    ("Mobile", 15.0),
    ("Message", 40.0),
    ("Submitted At", 20.0),
];

#[derive(Clone)]
pub struct ExportService {
    admissions: AdmissionService,
    enquiries: EnquiryService,
    public_url: String,
}

impl ExportService {
    pub fn new(admissions: AdmissionService, enquiries: EnquiryService, public_url: &str) -> Self {
        Self {
            admissions,
            enquiries,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn export(&self, kind: ExportKind, query: &ListQuery) -> AppResult<ExportFile> {
        let bytes = match kind {
            ExportKind::Admissions => {
                let rows = self.admissions.find_all(query).await?;
                admissions_workbook(&rows, &self.public_url)?
            }
            ExportKind::Enquiries => {
                let rows = self.enquiries.find_all(query.search.as_deref()).await?;
                enquiries_workbook(&rows)?
            }
        };

        let file_name = format!("{}-{}.xlsx", kind.as_str(), Utc::now().format("%Y-%m-%d"));
        log::info!("Exported {file_name} ({} bytes)", bytes.len());
        Ok(ExportFile { file_name, bytes })
    }
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_BACKGROUND))
        .set_pattern(FormatPattern::Solid)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

fn write_header(sheet: &mut Worksheet, columns: &[(&str, f64)]) -> AppResult<()> {
    let format = header_format();
    for (col, (title, width)) in columns.iter().enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, *width)?;
        sheet.write_string_with_format(0, col, *title, &format)?;
    }
    Ok(())
}

fn write_row(sheet: &mut Worksheet, row: u32, cells: &[String]) -> AppResult<()> {
    for (col, value) in cells.iter().enumerate() {
        sheet.write_string(row, col as u16, value)?;
    }
    Ok(())
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Stored photo paths are site-relative
fn absolute_url(public_url: &str, path: Option<&str>) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(p) if p.starts_with("http://") || p.starts_with("https://") => p.to_string(),
        Some(p) => format!("{public_url}{p}"),
        None => String::new(),
    }
}

pub fn admissions_workbook(rows: &[admissions::Model], public_url: &str) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Admissions")?;
        write_header(sheet, &ADMISSION_COLUMNS)?;

        for (i, a) in rows.iter().enumerate() {
            let cells = [
                a.application_number.clone().unwrap_or_default(),
                a.first_name.clone(),
                a.middle_name.clone(),
                a.last_name.clone(),
                a.grade.clone(),
                a.board.to_string(),
                a.dob.format("%Y-%m-%d").to_string(),
                a.gender.clone(),
                a.father_email.clone(),
                a.father_mobile.clone(),
                a.mother_email.clone(),
                a.mother_mobile.clone(),
                absolute_url(public_url, a.student_photo_url.as_deref()),
                absolute_url(public_url, a.father_photo_url.as_deref()),
                absolute_url(public_url, a.mother_photo_url.as_deref()),
                a.status.to_string(),
                timestamp(&a.submitted_at),
            ];
            write_row(sheet, i as u32 + 1, &cells)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

pub fn enquiries_workbook(rows: &[enquiries::Model]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Enquiries")?;
        write_header(sheet, &ENQUIRY_COLUMNS)?;

        for (i, e) in rows.iter().enumerate() {
            let cells = [
                e.child_name.clone(),
                e.grade.clone(),
                e.boarding_type.clone(),
                e.email.clone(),
                e.mobile.clone(),
                e.message.clone(),
                timestamp(&e.submitted_at),
            ];
            write_row(sheet, i as u32 + 1, &cells)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}
