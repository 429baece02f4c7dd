use pyo3::prelude::*;

pub mod bank;
pub mod curve;
pub mod evaluator;
pub mod fastpath;
pub mod sensors;
pub mod utils;

pub use bank::*;
pub use curve::*;
pub use evaluator::*;
pub use fastpath::*;
pub use sensors::*;
pub use utils::*;

#[pymodule]
fn thermocal_backend(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<Calibrator>()?;
    Ok(())
}
