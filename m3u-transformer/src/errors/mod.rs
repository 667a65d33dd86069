use axum::http::StatusCode;

/// Errors that know which response status they stand for
pub trait HttpStatus {
    fn status_code(&self) -> StatusCode;
}

/// Maps an error to its own status code, logging server errors at `error`
/// and the rest at `warn`.
///
/// ```ignore
/// state.storage.get(&id).await.map_err(status_with_log!("Load playlist"))?;
/// ```
#[macro_export]
macro_rules! status_with_log {
    () => {
        $crate::status_with_log!("Request failed")
    };

    ($position:expr) => {
        |e| {
            use log::{error, warn};
            use $crate::errors::HttpStatus;

            let status_code = e.status_code();
            if status_code.is_server_error() {
                error!("{}: {}", $position, e);
            } else {
                warn!("{}: {}", $position, e);
            }
            status_code
        }
    };
}

pub use status_with_log;
