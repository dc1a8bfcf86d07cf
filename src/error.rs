/// Errors produced by the store, the relationship checks and the CSV importer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Bad login credentials. Carries no detail so callers cannot tell a
    /// missing account from a wrong password.
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Malformed CSV on line {line}: {reason}")]
    Csv { line: usize, reason: String },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
