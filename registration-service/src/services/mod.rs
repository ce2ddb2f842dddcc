pub mod database;
pub mod error;
pub mod memory;
pub mod registration;
pub mod store;

pub use database::MongoUserStore;
pub use error::RegistrationError;
pub use memory::InMemoryUserStore;
pub use registration::RegistrationService;
pub use store::{StoreError, UserStore};
