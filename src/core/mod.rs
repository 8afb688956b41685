pub mod identity;
pub mod label;
pub mod todo;
pub mod vent;
