//! Playlist rewriting core.
//!
//! [`resolver`] turns relative references from a fetched playlist into
//! fully-qualified upstream URLs; [`rewriter`] walks the playlist text and
//! substitutes every reference with a proxy-relative URL so the player's
//! follow-up requests route back through this server.

pub mod resolver;
pub mod rewriter;
