//! User-facing error messages for the report.
//!
//! Errors are matched by type (PolarsError variants, io::ErrorKind) so the
//! error panel can say what went wrong without a backtrace.

use polars::prelude::PolarsError;
use std::io;

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!(
            "Column not found: {}. The dataset may not match the cleaned used-cars schema.",
            msg
        ),
        PE::SchemaFieldNotFound(msg) => format!("Schema field not found: {}", msg),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!(
            "Schema mismatch: {}. Check that the column has the expected type.",
            msg
        ),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::OutOfBounds(msg) => format!("Index or row out of bounds: {}", msg),
        PE::ComputeError(msg) => format!("Computation failed: {}", first_line(msg)),
        PE::Context { error, msg } => {
            format!("{}: {}", msg, user_message_from_polars(error))
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by walking its cause chain for a PolarsError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report) -> String {
    for cause in report.chain() {
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return user_message_from_polars(pe);
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return user_message_from_io(io_err, None);
        }
    }
    first_line(&report.to_string())
}

fn first_line(msg: &str) -> String {
    msg.lines()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("An error occurred")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_from_io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, Some("cleaned_df.parquet"));
        assert_eq!(msg, "File or directory not found. cleaned_df.parquet");
    }

    #[test]
    fn test_user_message_from_polars_column_not_found() {
        let err = PolarsError::ColumnNotFound("state".into());
        let msg = user_message_from_polars(&err);
        assert!(msg.starts_with("Column not found"), "got: {}", msg);
        assert!(msg.contains("state"), "got: {}", msg);
    }

    #[test]
    fn test_report_chain_finds_io_error() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let report = color_eyre::eyre::Report::new(err).wrap_err("Failed to export chart");
        assert_eq!(
            user_message_from_report(&report),
            "Permission denied. Check read access."
        );
    }

    #[test]
    fn test_report_fallback_uses_first_line() {
        let report = color_eyre::eyre::eyre!("No data to export\nmore detail");
        assert_eq!(user_message_from_report(&report), "No data to export");
    }
}
