//! Operation types: raw calls, validated operations, execution results.

pub mod call;
pub mod result;
pub mod validated;

pub use call::OperationCall;
pub use result::{ExecutionResult, describe_failures};
pub use validated::{AlignEdge, DistributeAxis, ValidatedOperation};
