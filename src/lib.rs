pub mod error;
pub mod handlers;
pub mod models;
pub mod orders;
pub mod reports;
pub mod schema;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
