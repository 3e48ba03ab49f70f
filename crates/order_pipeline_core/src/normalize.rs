use uuid::Uuid;

use crate::contract::{CanonicalOrder, PipelineError, RawOrderRow, RejectedRow};

pub const EMAIL_COLUMN: &str = "email";
pub const PRICE_COLUMN: &str = "price";
pub const PRODUCTS_COLUMN: &str = "products";
pub const DATE_COLUMN: &str = "date";
pub const PRODUCT_SEPARATOR: char = ';';

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRows {
    pub orders: Vec<CanonicalOrder>,
    pub rejected: Vec<RejectedRow>,
}

/// Converts one parsed row into a canonical order with a fresh id.
///
/// `row` is the 1-indexed data row number used in error reports.
pub fn normalize_row(row: usize, raw: &RawOrderRow) -> Result<CanonicalOrder, PipelineError> {
    build_order(row, raw, Uuid::new_v4().to_string())
}

/// Normalizes every row, keeping input order. Rows that fail are excluded and
/// reported instead of aborting their siblings.
pub fn normalize_rows(rows: &[RawOrderRow]) -> NormalizedRows {
    let mut normalized = NormalizedRows {
        orders: Vec::with_capacity(rows.len()),
        rejected: Vec::new(),
    };

    for (index, raw) in rows.iter().enumerate() {
        match normalize_row(index + 1, raw) {
            Ok(order) => normalized.orders.push(order),
            Err(PipelineError::MalformedRecord { row, reason }) => {
                normalized.rejected.push(RejectedRow { row, reason });
            }
            Err(other) => normalized.rejected.push(RejectedRow {
                row: index + 1,
                reason: other.to_string(),
            }),
        }
    }

    normalized
}

fn build_order(row: usize, raw: &RawOrderRow, id: String) -> Result<CanonicalOrder, PipelineError> {
    let email = non_empty_column(row, raw, EMAIL_COLUMN)?;
    let date = non_empty_column(row, raw, DATE_COLUMN)?;
    let price = parse_price(row, required_column(row, raw, PRICE_COLUMN)?)?;

    Ok(CanonicalOrder {
        id,
        email: email.to_string(),
        price,
        products: split_products(raw.get(PRODUCTS_COLUMN).map(String::as_str)),
        date: date.to_string(),
    })
}

fn required_column<'a>(
    row: usize,
    raw: &'a RawOrderRow,
    column: &str,
) -> Result<&'a str, PipelineError> {
    raw.get(column)
        .map(String::as_str)
        .ok_or_else(|| PipelineError::MalformedRecord {
            row,
            reason: format!("missing '{column}' column"),
        })
}

/// Email and date feed the storage key, which cannot be built from an empty
/// value.
fn non_empty_column<'a>(
    row: usize,
    raw: &'a RawOrderRow,
    column: &str,
) -> Result<&'a str, PipelineError> {
    let value = required_column(row, raw, column)?;
    if value.is_empty() {
        return Err(PipelineError::MalformedRecord {
            row,
            reason: format!("'{column}' must not be empty"),
        });
    }
    Ok(value)
}

fn parse_price(row: usize, value: &str) -> Result<f64, PipelineError> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(PipelineError::MalformedRecord {
            row,
            reason: format!("price '{value}' is not a finite number"),
        }),
    }
}

fn split_products(value: Option<&str>) -> Vec<String> {
    match value {
        Some(text) if !text.is_empty() => text
            .split(PRODUCT_SEPARATOR)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
