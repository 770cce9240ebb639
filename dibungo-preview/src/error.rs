use thiserror::Error;

use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl PreviewError {
    /// A 404/410 from the fetch layer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PreviewError::Fetch(e) if e.is_not_found())
    }
}

pub type PreviewResult<T> = Result<T, PreviewError>;
