pub mod id;
pub mod page;
pub mod path;
