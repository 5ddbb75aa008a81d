pub mod announcement;
pub mod contact;
pub mod event;
pub mod fields;
pub mod gallery;
pub mod page;
pub mod site;
pub mod sponsor;
pub mod vendor;

pub use announcement::*;
pub use contact::*;
pub use event::*;
pub use gallery::*;
pub use page::*;
pub use site::*;
pub use sponsor::*;
pub use vendor::*;
