pub mod analytics;
pub mod catalog;
pub mod db;
pub mod error;
pub mod estimator;
pub mod grades;
pub mod recommend;
pub mod service;
pub mod sgpa;
pub mod validate;
pub mod whatif;

pub use error::PredictorError;
