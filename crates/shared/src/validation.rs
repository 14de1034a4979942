//! Common validation utilities.

use validator::ValidationError;

/// Maximum number of grid columns or rows on a dashboard.
pub const MAX_GRID_DIMENSION: u32 = 48;

/// Maximum length of a widget title.
const MAX_WIDGET_TITLE_LENGTH: usize = 100;

/// Maximum length of a widget data-source key.
const MAX_DATA_SOURCE_KEY_LENGTH: usize = 200;

fn error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a grid dimension is within 1..=48.
pub fn validate_grid_dimension(value: u32) -> Result<(), ValidationError> {
    if (1..=MAX_GRID_DIMENSION).contains(&value) {
        Ok(())
    } else {
        Err(error(
            "grid_dimension_range",
            format!("Grid dimensions must be between 1 and {}", MAX_GRID_DIMENSION),
        ))
    }
}

/// Validates that a widget title is non-blank and at most 100 characters.
pub fn validate_widget_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(error(
            "widget_title_empty",
            "Widget title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_WIDGET_TITLE_LENGTH {
        return Err(error(
            "widget_title_length",
            format!(
                "Widget title must be at most {} characters",
                MAX_WIDGET_TITLE_LENGTH
            ),
        ));
    }
    Ok(())
}

/// Validates a dotted data-source key such as `revenue.byService`.
///
/// Keys are non-empty segments of ASCII alphanumerics, `_` or `-`, joined by `.`.
pub fn validate_data_source_key(key: &str) -> Result<(), ValidationError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_DATA_SOURCE_KEY_LENGTH
        && key.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });

    if valid {
        Ok(())
    } else {
        Err(error(
            "data_source_key_format",
            format!("Invalid data source key '{}'", key),
        ))
    }
}

/// Validates that a widget of the given size sits entirely inside the grid.
pub fn validate_widget_placement(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    columns: u32,
    rows: u32,
) -> Result<(), ValidationError> {
    if width == 0 || height == 0 {
        return Err(error(
            "widget_size",
            "Widget width and height must be at least 1".to_string(),
        ));
    }

    let fits_columns = x.checked_add(width).is_some_and(|right| right <= columns);
    let fits_rows = y.checked_add(height).is_some_and(|bottom| bottom <= rows);

    if fits_columns && fits_rows {
        Ok(())
    } else {
        Err(error(
            "widget_placement",
            format!(
                "Widget at ({}, {}) sized {}x{} does not fit a {}x{} grid",
                x, y, width, height, columns, rows
            ),
        ))
    }
}

/// Replaces characters that are unsafe in file names with `_`.
///
/// Letters, digits, spaces, `-`, `_` and `.` are kept as-is.
pub fn sanitize_file_stem(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = sanitized.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.to_string()
    }
}
