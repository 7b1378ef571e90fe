use crate::core::error::DxfError;

pub type Result<T> = std::result::Result<T, DxfError>;
