pub mod auth;
pub mod browse;
pub mod contact;
pub mod owner;
pub mod tenant;
pub mod tui;

use crate::api::ApiError;
use crate::cli::ExitError;

pub(crate) fn api_exit(e: ApiError) -> ExitError {
    match e {
        ApiError::Status { message, .. } => ExitError::new(4, format!("api_error: {message}")),
        ApiError::Transport(e) => ExitError::new(5, format!("http_error: {e}")),
    }
}

/// Render a price the way the listings show it: whole rupees without a
/// fractional part unless the backend sent one.
pub(crate) fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{price}")
    }
}

pub(crate) fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, ExitError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ExitError::new(2, format!("invalid_args: {e}")))
}
