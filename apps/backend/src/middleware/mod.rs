pub mod auth_guard;
pub mod cors;
pub mod request_trace;
pub mod structured_logger;

pub use auth_guard::AuthGuard;
pub use cors::cors_middleware;
pub use request_trace::RequestTrace;
pub use structured_logger::StructuredLogger;

pub mod trace_span;
pub use trace_span::TraceSpan;
