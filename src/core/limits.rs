/*!
 * Limits and Constants
 *
 * Centralized location for thresholds, defaults and magic numbers used by
 * rule rendering, the content cache and the mount front-end.
 * Organized by domain for maintainability and discoverability.
 *
 * - Performance-related constants are marked with [PERF]
 * - Values that must match an external format are marked with [FORMAT]
 */

use std::time::Duration;

// =============================================================================
// CONTENT CACHE
// =============================================================================

/// Eviction stops once the remaining deficit is at or below this many bytes
/// [PERF] Avoids evicting a whole entry to recover a handful of bytes
pub const CACHE_EVICTION_SLACK: u64 = 50;

// =============================================================================
// RENDERING
// =============================================================================

/// Estimated header overhead of an encoded image file (bytes)
/// Added to `width * height * bytes_per_sample` for size reporting
pub const IMAGE_HEADER_OVERHEAD: u64 = 186;

/// Bit depth used when an image rule does not configure one
pub const DEFAULT_BIT_DEPTH: u16 = 32;

/// Smallest accepted bit depth; lower values fall back to the default
pub const MIN_BIT_DEPTH: u16 = 8;

/// Decimal precision for tabular floating-point values
pub const DEFAULT_PRECISION: usize = 2;

/// Largest accepted decimal precision; f64 carries no more significant digits
pub const MAX_PRECISION: usize = 17;

/// Largest accepted `column_count` for group tables
/// [PERF] Each column costs a title lookup and a source read per render
pub const MAX_TABLE_COLUMNS: usize = 1024;

/// Column separator when a table rule does not configure one
pub const DEFAULT_SEPARATOR: &str = ",";

/// Title used for table columns without a configured title
pub const UNTITLED_COLUMN: &str = "Untitled";

/// Rendered in place of a missing table cell
pub const NULL_CELL: &str = "null";

/// Content returned when an element type has no renderer
pub const RENDER_ERROR_PLACEHOLDER: &str = "An error occurred, see log file\n";

/// Image resolution written into encoded frames (dots per inch)
/// [FORMAT] Stored as a TIFF rational
pub const IMAGE_RESOLUTION_DPI: u32 = 150;

// =============================================================================
// MOUNT FRONT-END
// =============================================================================

/// Last path segment that triggers a source reopen instead of a lookup
pub const RELOAD_TRIGGER: &str = "fuse_reload";

/// Rules document used when none is given on the command line
pub const DEFAULT_RULES_PATH: &str = "/etc/nxfs/rules.xml";

/// Filesystem calls slower than this are logged as warnings
pub const SLOW_OPERATION_THRESHOLD: Duration = Duration::from_millis(10);

/// Attribute cache lifetime handed to the kernel by the adaptor
pub const ATTR_TTL: Duration = Duration::from_secs(1);
