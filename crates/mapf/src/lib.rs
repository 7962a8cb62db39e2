pub mod cbs;
pub mod leg;

pub use cbs::CbsWrapper;
pub use leg::plan_leg;
