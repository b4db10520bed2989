pub mod aggregate;
pub mod bounds;
pub mod table;

pub use aggregate::{analyze, process_bursts, within_tolerance, BurstOptions, BURST_TOLERANCE_MINUTES};
pub use bounds::{find_bounds, natural_gaps};
pub use table::{BurstTable, Columns, END_TIME};
