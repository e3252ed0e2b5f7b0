// Scan phases, in execution order. Each one is a single synchronous pass
// over the units collected so far.

#[path = "01_walk.rs"]
pub mod walk;
#[path = "02_units.rs"]
pub mod units;
#[path = "03_vendor_names.rs"]
pub mod vendor_names;
#[path = "04_commits.rs"]
pub mod commits;
#[path = "05_patterns.rs"]
pub mod patterns;
#[path = "06_vendor_dirs.rs"]
pub mod vendor_dirs;
#[path = "07_prune.rs"]
pub mod prune;
