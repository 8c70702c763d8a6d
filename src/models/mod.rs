pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod payment;
pub mod records;
pub mod review;
pub mod user;

pub use appointment::*;
pub use doctor::*;
pub use enums::*;
pub use payment::*;
pub use records::*;
pub use review::*;
pub use user::*;
