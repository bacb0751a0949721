//! The fixed extraction instruction sent with every image.

/// Instruction for the model: date and amount only, in a fixed two-line
/// layout, with Buddhist Era years converted to Gregorian.
pub const EXTRACTION_PROMPT: &str = "\
Extract only these two details from this payment slip or receipt image:
1. Payment date
2. Payment amount in THB

Reply with exactly these two lines and nothing else:
Date: dd/mm/yyyy
Amount: <number> THB

If the year is written in the Buddhist Era (B.E., for example 2567), \
subtract 543 to get the Gregorian year before writing the date.";
