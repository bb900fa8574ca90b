//! Error type for widget construction.

/// Errors returned by this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No element in the host document matches the configured container
    /// selector.
    #[error("[toprogress] element not found with selector {selector}")]
    ContainerNotFound {
        /// The selector that matched nothing.
        selector: String,
    },
}

impl Error {
    pub(crate) fn container_not_found(selector: impl Into<String>) -> Self {
        Self::ContainerNotFound {
            selector: selector.into(),
        }
    }
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
