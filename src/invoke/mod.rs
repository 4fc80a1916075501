//! Invocation dispatch: transport seam, attempt loop, result mapping.

mod executor;
mod local;
mod result;
mod transport;

pub use executor::{AttemptResult, Invoker};
pub use local::{LocalFunctions, LocalHandler};
pub use result::{map_result, InvocationOutcome, ResponseFields};
pub use transport::{FunctionTransport, InvokeOutput, InvokeRequest};
