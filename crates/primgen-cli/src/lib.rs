//! Library side of the `primgen` command-line driver.

pub mod logging;
pub mod pipeline;
