pub mod field_ops;
pub mod member_store;
