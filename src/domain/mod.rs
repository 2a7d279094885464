pub mod user;
pub mod course;
pub mod payment;
pub mod enrollment;
pub mod money;

pub use user::*;
pub use course::*;
pub use payment::*;
pub use enrollment::*;
pub use money::*;
