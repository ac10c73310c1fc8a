//! Human-readable ticket numbers.
//!
//! Format: `TKT-<issue time in Unix ms>-<6 random digits>`. The number is
//! printed on the ticket and read out at the door; it is covered by the
//! token digest like every other field but carries no secret itself.

use rand::Rng;

use crate::token::now_ms;

pub const TICKET_NUMBER_PREFIX: &str = "TKT";

const RANDOM_DIGITS: usize = 6;

/// Generates a ticket number stamped with the current time.
pub fn generate_ticket_number() -> String {
    generate_ticket_number_at(now_ms(), &mut rand::thread_rng())
}

pub fn generate_ticket_number_at<R: Rng + ?Sized>(timestamp_ms: u64, rng: &mut R) -> String {
    let suffix: u32 = rng.gen_range(0..1_000_000);
    format!(
        "{}-{}-{:0width$}",
        TICKET_NUMBER_PREFIX,
        timestamp_ms,
        suffix,
        width = RANDOM_DIGITS
    )
}

/// True if `candidate` has the shape produced by [`generate_ticket_number`].
pub fn is_well_formed(candidate: &str) -> bool {
    let mut parts = candidate.split('-');

    let (Some(prefix), Some(millis), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == TICKET_NUMBER_PREFIX
        && !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == RANDOM_DIGITS
        && suffix.bytes().all(|b| b.is_ascii_digit())
}
