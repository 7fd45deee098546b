pub mod sampler;
pub mod token;
pub mod unique;
