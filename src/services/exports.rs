//! Book list spreadsheet export.
//!
//! Renders a filtered book list (and optionally a per-copy sheet) into an
//! xlsx workbook. Column selection defaults to [`DEFAULT_BOOK_COLUMNS`];
//! unknown keys render as empty cells rather than failing the export.

use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use crate::{
    error::{AppError, AppResult},
    models::book::{BookExportFilter, BookExportRow, ItemExportRow},
    repository::Repository,
};

/// Columns rendered when the caller does not pick any
pub const DEFAULT_BOOK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "authors",
    "categories",
    "isbn13",
    "publisher",
    "publisher_founded_year",
    "publish_year",
    "language",
    "cover_url",
    "total_items",
    "available_items",
    "reserved_items",
    "loaned_items",
    "lost_items",
    "damaged_items",
    "total_loans",
    "last_loan_date",
    "avg_rating",
    "total_favorites",
    "created_at",
];

const ITEM_SHEET_HEADERS: &[&str] = &[
    "Book ID",
    "Title",
    "Barcode",
    "Status",
    "Location",
    "Created At",
    "Currently Loaned",
    "Due Date",
    "Loan Status",
];

const MAX_COLUMN_WIDTH: f64 = 60.0;

/// One rendered cell
enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Empty,
}

impl Cell {
    fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => format!("{:.2}", v),
            Cell::Empty => String::new(),
        }
    }
}

/// "publisher_founded_year" -> "Publisher Founded Year"
fn header_label(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn cell_value(row: &BookExportRow, key: &str) -> Cell {
    match key {
        "id" => Cell::Int(row.id as i64),
        "title" => Cell::Text(row.title.clone()),
        "authors" => Cell::Text(row.authors.clone()),
        "categories" => Cell::Text(row.categories.clone()),
        "isbn13" => Cell::Text(row.isbn13.clone().unwrap_or_default()),
        "publisher" => Cell::Text(row.publisher_name.clone().unwrap_or_default()),
        "publisher_founded_year" => match row.publisher_founded_year {
            Some(year) => Cell::Int(year as i64),
            None => Cell::Empty,
        },
        "publish_year" => match row.publish_year {
            Some(year) => Cell::Int(year as i64),
            None => Cell::Empty,
        },
        "language" => Cell::Text(row.language_code.clone().unwrap_or_default()),
        "cover_url" => Cell::Text(row.cover_url.clone().unwrap_or_default()),
        "total_items" => Cell::Int(row.total_items),
        "available_items" => Cell::Int(row.available_items),
        "reserved_items" => Cell::Int(row.reserved_items),
        "loaned_items" => Cell::Int(row.loaned_items),
        "lost_items" => Cell::Int(row.lost_items),
        "damaged_items" => Cell::Int(row.damaged_items),
        "total_loans" => Cell::Int(row.total_loans),
        "last_loan_date" => match row.last_loan_date {
            Some(date) => Cell::Text(date.to_string()),
            None => Cell::Empty,
        },
        "avg_rating" => match row.avg_rating {
            Some(rating) => Cell::Float((rating * 100.0).round() / 100.0),
            None => Cell::Empty,
        },
        "total_favorites" => Cell::Int(row.total_favorites),
        "created_at" => Cell::Text(row.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        // Unknown key
        _ => Cell::Empty,
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
) -> Result<(), XlsxError> {
    match cell {
        Cell::Text(s) => {
            worksheet.write_string(row, col, s.as_str())?;
        }
        Cell::Int(v) => {
            worksheet.write_number(row, col, *v as f64)?;
        }
        Cell::Float(v) => {
            worksheet.write_number(row, col, *v)?;
        }
        Cell::Empty => {}
    }
    Ok(())
}

fn apply_widths(worksheet: &mut Worksheet, widths: &[usize]) -> Result<(), XlsxError> {
    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, ((width + 2) as f64).min(MAX_COLUMN_WIDTH))?;
    }
    Ok(())
}

/// Render the workbook: a Books sheet, plus an Items sheet when copy rows
/// are provided.
fn render_workbook(
    rows: &[BookExportRow],
    items: Option<&[ItemExportRow]>,
    columns: &[String],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Books")?;

        let headers: Vec<String> = columns.iter().map(|c| header_label(c)).collect();
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, header.as_str())?;
        }

        for (row_idx, book) in rows.iter().enumerate() {
            for (col, key) in columns.iter().enumerate() {
                let cell = cell_value(book, key);
                widths[col] = widths[col].max(cell.display().chars().count());
                write_cell(worksheet, (row_idx + 1) as u32, col as u16, &cell)?;
            }
        }

        apply_widths(worksheet, &widths)?;
    }

    if let Some(items) = items {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Items")?;

        let mut widths: Vec<usize> = ITEM_SHEET_HEADERS
            .iter()
            .map(|h| h.chars().count())
            .collect();

        for (col, header) in ITEM_SHEET_HEADERS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }

        for (row_idx, item) in items.iter().enumerate() {
            let currently_loaned = item.loan_status.map(|s| s.is_open()).unwrap_or(false);
            let cells = [
                Cell::Int(item.book_id as i64),
                Cell::Text(item.title.clone()),
                Cell::Text(item.barcode.clone()),
                Cell::Text(item.status.display().to_string()),
                Cell::Text(item.location_code.clone().unwrap_or_default()),
                Cell::Text(item.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::Text(if currently_loaned { "Yes" } else { "No" }.to_string()),
                match item.due_date {
                    Some(date) => Cell::Text(date.to_string()),
                    None => Cell::Empty,
                },
                match item.loan_status {
                    Some(status) => Cell::Text(status.display().to_string()),
                    None => Cell::Empty,
                },
            ];
            for (col, cell) in cells.iter().enumerate() {
                widths[col] = widths[col].max(cell.display().chars().count());
                write_cell(worksheet, (row_idx + 1) as u32, col as u16, cell)?;
            }
        }

        apply_widths(worksheet, &widths)?;
    }

    workbook.save_to_buffer()
}

/// A rendered export ready to be served as an attachment
pub struct RenderedExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ExportsService {
    repository: Repository,
}

impl ExportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Export the filtered book list to an xlsx workbook
    pub async fn export_books(
        &self,
        filter: &BookExportFilter,
        columns: Option<Vec<String>>,
        include_items: bool,
        filename: Option<String>,
    ) -> AppResult<RenderedExport> {
        let columns: Vec<String> = match columns {
            Some(cols) if !cols.is_empty() => cols,
            _ => DEFAULT_BOOK_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };

        let rows = self.repository.books.export_rows(filter).await?;
        let items = if include_items {
            Some(self.repository.books.export_item_rows(filter).await?)
        } else {
            None
        };

        let bytes = render_workbook(&rows, items.as_deref(), &columns)
            .map_err(|e| AppError::Internal(format!("Failed to render workbook: {}", e)))?;

        let filename = filename
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| format!("books_export_{}", Utc::now().format("%Y%m%d_%H%M%S")));

        tracing::info!(
            books = rows.len(),
            include_items,
            filename,
            "rendered book export"
        );

        Ok(RenderedExport { filename, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{ItemStatus, LoanStatus};
    use chrono::{NaiveDate, TimeZone};

    fn sample_row() -> BookExportRow {
        BookExportRow {
            id: 7,
            title: "The Trial".to_string(),
            isbn13: Some("9780805209990".to_string()),
            publisher_name: Some("Schocken".to_string()),
            publisher_founded_year: Some(1931),
            publish_year: Some(1925),
            language_code: Some("de".to_string()),
            cover_url: None,
            authors: "Franz Kafka".to_string(),
            categories: "Fiction, Classics".to_string(),
            total_items: 3,
            available_items: 1,
            reserved_items: 0,
            loaned_items: 2,
            lost_items: 0,
            damaged_items: 0,
            total_loans: 11,
            last_loan_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            avg_rating: Some(4.467),
            total_favorites: 5,
            created_at: chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn header_labels_title_case_each_word() {
        assert_eq!(header_label("id"), "Id");
        assert_eq!(header_label("publisher_founded_year"), "Publisher Founded Year");
        assert_eq!(header_label("isbn13"), "Isbn13");
        assert_eq!(header_label("last_loan_date"), "Last Loan Date");
    }

    #[test]
    fn cell_values_match_their_column() {
        let row = sample_row();
        assert_eq!(cell_value(&row, "id").display(), "7");
        assert_eq!(cell_value(&row, "title").display(), "The Trial");
        assert_eq!(cell_value(&row, "authors").display(), "Franz Kafka");
        assert_eq!(cell_value(&row, "avg_rating").display(), "4.47");
        assert_eq!(cell_value(&row, "last_loan_date").display(), "2024-05-02");
        assert_eq!(cell_value(&row, "created_at").display(), "2024-01-02 03:04:05");
        assert_eq!(cell_value(&row, "cover_url").display(), "");
    }

    #[test]
    fn unknown_columns_render_empty() {
        let row = sample_row();
        assert!(matches!(cell_value(&row, "no_such_column"), Cell::Empty));
    }

    #[test]
    fn workbook_renders_to_xlsx_bytes() {
        let columns: Vec<String> = DEFAULT_BOOK_COLUMNS.iter().map(|c| c.to_string()).collect();
        let items = vec![ItemExportRow {
            book_id: 7,
            title: "The Trial".to_string(),
            barcode: "BC-0001".to_string(),
            status: ItemStatus::Loaned,
            location_code: Some("A-12".to_string()),
            created_at: chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            loan_status: Some(LoanStatus::Borrowed),
        }];
        let bytes = render_workbook(&[sample_row()], Some(&items), &columns).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_exports_still_render() {
        let columns = vec!["id".to_string(), "title".to_string()];
        let bytes = render_workbook(&[], None, &columns).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
