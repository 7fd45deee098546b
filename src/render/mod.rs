pub mod assets;
pub mod composite;
pub mod compositor;
pub mod pipeline;
pub mod zorder;
