pub mod worker;
pub mod worker_ctx;

pub use worker::Worker;
pub use worker_ctx::ItemCtx;
