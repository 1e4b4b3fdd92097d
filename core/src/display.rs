use alloc::format;
use alloc::string::{String, ToString};

/// Formats a number for a three digit seven-segment style counter.
pub fn format_for_counter(num: i32) -> String {
    match num {
        ..-99 => "-99".to_string(),
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

/// Elapsed seconds as shown on the timer, which stops at 999.
pub fn format_elapsed(secs: u64) -> String {
    format_for_counter(secs.min(999) as i32)
}

/// Remaining mines as shown on the counter, which can go negative with too many flags.
pub fn format_mines_left(mines_left: isize) -> String {
    format_for_counter(mines_left.clamp(i32::MIN as isize, i32::MAX as isize) as i32)
}
