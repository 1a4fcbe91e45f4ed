pub mod accounts;
pub mod order_lines;

pub use accounts::Entity as Accounts;
pub use order_lines::Entity as OrderLines;
