pub use super::entries::Entity as Entries;
pub use super::users::Entity as Users;
