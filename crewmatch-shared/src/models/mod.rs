/// Database models for Crewmatch
///
/// Each model owns its query operations, one parameterized statement per
/// function. Multi-step writes (profile plus skill replacement, post plus
/// required skills) run inside a single transaction.
///
/// # Models
///
/// - `user`: User accounts, roles, and profile updates
/// - `skill`: The shared skill vocabulary and its join-table maintenance
/// - `post`: Project listings with required skills and skill matching
/// - `invitation`: The post/user relation created by applying or inviting

pub mod invitation;
pub mod post;
pub mod skill;
pub mod user;
