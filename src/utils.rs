//! Utility functions for common operations
//!
//! Size labels and ratio math shared by the preview renderer and the
//! command-line summary.

use crate::constants::{SIZE_THRESHOLD, SIZE_UNITS};

/// Format file size in human-readable format
///
/// Base 1024, units Bytes/KB/MB, at most two decimals with trailing zeros
/// trimmed. Anything from 1 GiB up is still expressed in MB.
///
/// # Example
/// ```
/// use squeeze_pack::utils::format_file_size;
///
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return format!("0 {}", SIZE_UNITS[0]);
    }

    let mut divisor = 1u64;
    let mut unit_index = 0;

    while bytes / divisor >= SIZE_THRESHOLD && unit_index < SIZE_UNITS.len() - 1 {
        divisor *= SIZE_THRESHOLD;
        unit_index += 1;
    }

    format!("{} {}", trim_decimals(bytes, divisor), SIZE_UNITS[unit_index])
}

/// `bytes / divisor` to two decimals, ties rounded up, trailing zeros trimmed.
fn trim_decimals(bytes: u64, divisor: u64) -> String {
    let divisor = u128::from(divisor);
    let hundredths = (u128::from(bytes) * 200 + divisor) / (2 * divisor);
    let whole = hundredths / 100;
    let fraction = hundredths % 100;

    match fraction {
        0 => whole.to_string(),
        f if f % 10 == 0 => format!("{}.{}", whole, f / 10),
        f => format!("{}.{:02}", whole, f),
    }
}

/// Calculate compression ratio as a percentage
///
/// Positive means the output is smaller, negative means it grew.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

/// Progress as a whole percentage, `round(100 * processed / total)` with
/// halves rounded up.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let processed = processed.min(total);
    ((200 * processed + total) / (2 * total)) as u8
}
