use thiserror::Error;

/// The fault taxonomy for the object store and tree/commit layer.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("not a git repository (or any parent up to root): {path}")]
    NoRepository { path: String },

    #[error("unsupported repositoryformatversion {version} (only 0 is supported)")]
    UnsupportedFormat { version: i64 },

    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    #[error("a repository already exists at {path}")]
    RepoAlreadyExists { path: String },

    #[error("malformed object {oid}: {message}")]
    MalformedObject { oid: String, message: String },

    #[error("malformed tree entry: {message}")]
    MalformedTree { message: String },

    #[error("object not found: {oid}")]
    ObjectNotFound { oid: String },

    #[error("unknown object kind: {kind}")]
    UnknownKind { kind: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GitError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        GitError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitError>;
