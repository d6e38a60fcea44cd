pub mod prelude;

pub mod entries;
pub mod users;
