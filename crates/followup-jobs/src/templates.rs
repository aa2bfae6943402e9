//! Compiled-in SMS templates.
//!
//! The texts live in code, not config — ops changes them via deploy, which
//! keeps the store free of presentation strings.

/// Watchdog reminder for a missed call with a passed callback time.
pub const REMINDER: &str = "Sorry we missed your call! Reply to this text and \
we'll get right back to you, or hang tight — a callback is on the way.";

const DRIP_DAY_1: &str = "Thanks for calling us yesterday! Still want to \
talk? Reply here and we'll set up a time that works for you.";

const DRIP_DAY_3: &str = "Just checking in — we'd still love to help. Reply \
to this text and we'll call you back today.";

const DRIP_DAY_7: &str = "Last nudge from us! If you'd still like a callback, \
reply here anytime and we'll get you on the schedule.";

/// The drip text for a given day offset. `None` for days without a
/// template — the runner must not synthesize message bodies.
pub fn drip_message(day: u32) -> Option<&'static str> {
    match day {
        1 => Some(DRIP_DAY_1),
        3 => Some(DRIP_DAY_3),
        7 => Some(DRIP_DAY_7),
        _ => None,
    }
}
