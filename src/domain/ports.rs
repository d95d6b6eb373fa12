use crate::domain::model::{BatchResult, RawRecord};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn fail_fast(&self) -> bool;
}

pub trait Pipeline {
    fn extract(&self) -> Result<Vec<RawRecord>>;
    fn transform(&self, records: Vec<RawRecord>) -> Result<BatchResult>;
    fn load(&self, result: BatchResult) -> Result<String>;
}
