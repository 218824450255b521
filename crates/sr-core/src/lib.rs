pub mod descriptor;
pub mod error;

pub use descriptor::*;
pub use error::ConvertError;
