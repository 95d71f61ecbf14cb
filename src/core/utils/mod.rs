pub mod bindgroup;
pub mod context;
pub mod latch;
pub mod pipeline;
