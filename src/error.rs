use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid draw margin: x={x}, y={y}, width={width}, height={height}")]
    InvalidDrawMargin {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("point {entity_index} in series {series_id} has no visual")]
    MissingVisual { series_id: u32, entity_index: usize },

    #[error("axis index {index} is out of range ({available} axes declared)")]
    UnknownAxis { index: usize, available: usize },
}
