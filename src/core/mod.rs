pub mod averages;
pub mod batch;
pub mod etl;
pub mod park_codes;
pub mod visitation_xml;

pub use crate::domain::model::{BatchRequest, MonthRecord, ParkRecord, RawBatch, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, VisitationSource};
pub use crate::utils::error::Result;
