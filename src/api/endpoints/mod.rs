//! API endpoint handlers. Each module is one resource; handlers only
//! translate between HTTP and the assessment service.

pub mod health;
pub mod records;
pub mod risk;
pub mod summary;
pub mod symptoms;
