//! Fixed phrases offered on the emergency screen

/// Phrases a user can speak with one tap, in display order
pub const EMERGENCY_PHRASES: [&str; 4] = [
    "I need help.",
    "Call the police.",
    "Where is the nearest hospital?",
    "I'm having an emergency.",
];

/// Look up a phrase by its zero-based position
pub fn phrase(index: usize) -> Option<&'static str> {
    EMERGENCY_PHRASES.get(index).copied()
}
