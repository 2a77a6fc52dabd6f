use crate::err::driver_error::DriverError;

pub mod driver_error;

pub type CResult<T> = Result<T, DriverError>;
