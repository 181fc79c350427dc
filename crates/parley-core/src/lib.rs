pub mod id;
pub mod join;

pub use join::settle_ordered;
