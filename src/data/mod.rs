pub mod normalize;
pub mod shop;
pub mod store;
pub mod validate;
