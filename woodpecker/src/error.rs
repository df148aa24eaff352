//! Provider error type

use crate::api::ApiError;
use tfplug::TfplugError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Framework(#[from] TfplugError),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_not_found())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
