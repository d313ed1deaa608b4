use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("A person with code {0} already exists")]
    DuplicateCode(String),

    #[error("No person with code {0}")]
    NotFound(String),

    #[error("Field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("Malformed snapshot: {0}")]
    MalformedInput(String),

    #[error("Persistence failure while trying to {context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AttendanceError>;

impl AttendanceError {
    pub fn persistence(context: impl Into<String>, source: std::io::Error) -> Self {
        AttendanceError::Persistence {
            context: context.into(),
            source,
        }
    }
}
