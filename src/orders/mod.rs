//! Order domain: transition rules, lifecycle engine, pricing and the
//! auto-completion sweeper.

pub mod lifecycle;
pub mod pricing;
pub mod status;
pub mod sweeper;

pub use lifecycle::OrderLifecycle;
pub use pricing::{OrderPricer, OrderRequest, RequestedLine};
pub use sweeper::AutoCompleteSweeper;
