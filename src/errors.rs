use crate::flags::ParseError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error reading batch file \"{file}\": {source}")]
    BatchIo {
        file: String,
        source: std::io::Error,
    },

    #[error("Batch file \"{0}\" contains no tasks")]
    EmptyBatch(String),

    #[error(transparent)]
    Options(#[from] ParseError),
}
