pub mod error;
pub mod position;
pub mod record;
pub mod traits;

pub use error::{SinkError, SinkResult, WriteError};
pub use position::Position;
pub use record::{Change, Data, Operation, Record, StructuredData, TableRef, Value};
pub use traits::Sink;
