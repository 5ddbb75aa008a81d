pub mod contact;
pub mod events;
pub mod gallery;
pub mod not_found;
pub mod page;
pub mod preview;
pub mod sections;
pub mod sponsors;
pub mod vendors;
