pub mod rating;

pub use rating::compute_rating;
