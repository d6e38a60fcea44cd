pub mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

pub mod password;
pub use password::PasswordService;

pub mod token;
pub use token::{TokenError, TokenIssuer};

pub mod ownership;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthScheme, AuthService, AuthenticatedIdentity};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{RegisterUser, UserError, UserService, UserUpdate};
pub use user_service_impl::SeaOrmUserService;

pub mod entry_service;
pub mod entry_service_impl;
pub use entry_service::{CreateEntry, EntryError, EntryService, EntryUpdate};
pub use entry_service_impl::SeaOrmEntryService;
