use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum IngestError {
    #[display("failed to open input source {source_name}")]
    Open { source_name: String },
    #[display("failed to read from input source")]
    Read,
    #[display("failed to decode price batch")]
    Decode,
    #[display("price batch has no Close, High or Low column")]
    NoPriceColumns,
    #[display("column {column} has {actual} rows, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("observation {index} is missing required field {field}")]
    MissingField { field: &'static str, index: usize },
    #[display("observation {index} has a non-finite {field}")]
    NonFinite { field: &'static str, index: usize },
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum PublishError {
    #[display("failed to serialize analysis report")]
    Serialize,
    #[display("failed to write analysis report")]
    Write,
}
