use thiserror::Error;

/// Errors raised while reading or writing descriptor documents.
///
/// Rendering itself never fails; only the file boundary does.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to access descriptor file '{path}': {source}. Check that the file exists and is readable.")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML descriptor: {0}. Check the file format.")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON descriptor: {0}. Check the file format.")]
    Json(#[from] serde_json::Error),
}
