pub mod allergy;
pub mod assessment;
pub mod enums;
pub mod medication;
pub mod record;

pub use allergy::*;
pub use assessment::*;
pub use enums::*;
pub use medication::*;
pub use record::*;
