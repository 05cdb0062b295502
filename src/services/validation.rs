//! Validation and normalization of book and lending input.
//!
//! Invoked by the books service before a book is created or updated and before
//! a lending is written.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookFields, BookInput, LendingInput, LendingRequest},
};

static ISBN10: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{9}[0-9X]$").unwrap());
static ISBN13: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{13}$").unwrap());

/// Validate an ISBN-10 or ISBN-13 and return it without separators.
///
/// An empty string is returned unchanged.
pub fn normalize_isbn(isbn: &str) -> AppResult<String> {
    let isbn: String = isbn
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if isbn.is_empty() {
        return Ok(isbn);
    }

    let digit = |c: u8| u32::from(c - b'0');
    let bytes = isbn.as_bytes();

    if ISBN10.is_match(&isbn) {
        let mut checksum: u32 = (0..9).map(|i| (i as u32 + 1) * digit(bytes[i])).sum();
        checksum += 10 * if bytes[9] == b'X' { 10 } else { digit(bytes[9]) };

        if checksum % 11 == 0 {
            Ok(isbn)
        } else {
            Err(AppError::Validation("Invalid ISBN-10".to_string()))
        }
    } else if ISBN13.is_match(&isbn) {
        let checksum: u32 = (0..12)
            .map(|i| (if i % 2 == 0 { 1 } else { 3 }) * digit(bytes[i]))
            .sum();

        if digit(bytes[12]) == (10 - checksum % 10) % 10 {
            Ok(isbn)
        } else {
            Err(AppError::Validation("Invalid ISBN-13".to_string()))
        }
    } else {
        Err(AppError::Validation("Invalid ISBN".to_string()))
    }
}

/// Integer from a JSON number or numeric string
pub fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Turn a create/update request into validated book fields
pub fn prepare_book(input: BookInput) -> AppResult<BookFields> {
    let year = lenient_int(input.year.as_ref()).and_then(|y| i32::try_from(y).ok());

    let fields = BookFields {
        title: trimmed(input.title),
        authors: trimmed(input.authors),
        topic: trimmed(input.topic),
        keywords: trimmed(input.keywords),
        signature: trimmed(input.signature),
        location: trimmed(input.location),
        isbn: normalize_isbn(input.isbn.as_deref().unwrap_or(""))?,
        year,
        publisher: trimmed(input.publisher),
        place_of_publication: trimmed(input.place_of_publication),
        volume: trimmed(input.volume),
        edition: trimmed(input.edition),
        lendable: input.lendable.unwrap_or(true),
    };

    fields.validate()?;
    Ok(fields)
}

/// Turn a lending request into a validated borrower and duration.
///
/// `days` falls back to `default_days` unless it is a positive integer.
pub fn prepare_lending(input: &LendingInput, default_days: i32) -> AppResult<LendingRequest> {
    let user = input
        .user
        .as_deref()
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .ok_or_else(|| AppError::BadRequest("Borrower is required".to_string()))?;

    let days = lenient_int(input.days.as_ref())
        .filter(|days| *days > 0)
        .and_then(|days| i32::try_from(days).ok())
        .unwrap_or(default_days);

    let request = LendingRequest {
        user: user.to_string(),
        days,
    };
    request.validate()?;
    Ok(request)
}
