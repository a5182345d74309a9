//! Access to the Linux `/proc` and `/sys` filesystems.
//!
//! ```text
//!   BridgeProcessResolver
//!            │
//!     NetnsInspector (trait)
//!            │
//!       SysfsNetns ──► FileSystem (trait)
//!                          │
//!                 ┌────────┴────────┐
//!                 │                 │
//!              RealFs             MockFs
//!             (Linux)     (Testing, Scenarios)
//! ```

pub mod mock;
pub mod parser;
pub mod traits;

pub use mock::MockFs;
pub use parser::ParseError;
pub use traits::{FileSystem, RealFs};
