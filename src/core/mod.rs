pub mod accounting;
pub mod action;
pub mod cancel;
pub mod conflict;
pub mod space;
pub mod summary;
pub mod totals;

pub use accounting::{PlanAccounting, PlanInput};
pub use action::{CopyAction, DeleteAction, Direction, FileEntry, Location, Side};
pub use cancel::{CancelCheck, CancelFn, NeverCancel};
pub use conflict::{detect_conflicts, ConflictGroup};
pub use space::{DiskSpace, FixedSpace, FreeSpaceProvider};
pub use summary::{format_bytes, format_signed_bytes, PlanSummary};
pub use totals::{DerivedTotals, SideDerived, SideSizes, SizeTotals};
