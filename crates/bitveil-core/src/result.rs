use crate::error::BitveilError;

pub type Result<T> = std::result::Result<T, BitveilError>;
