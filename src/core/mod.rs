pub mod batch;
pub mod engine;
pub mod scorer;
pub mod threshold;

pub use crate::domain::model::{BatchResult, FraudAssessment, RawRecord, Transaction};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
