pub mod account;
pub mod payment;

pub use account::Entity as Account;
pub use payment::Entity as Payment;
