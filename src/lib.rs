pub mod app;
pub mod core;
pub mod external;
pub mod pipeline;
