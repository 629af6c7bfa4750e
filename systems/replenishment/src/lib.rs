#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure replenishment system keeping every shape source stocked.
//!
//! Runs once per tick after placement so that a source whose instance was
//! consumed or deleted earlier in the same tick receives a fresh one before
//! the tick ends. The system holds no state of its own; the one-live-instance
//! rule is re-checked by the world when the spawn command executes.

use assembly_core::{geometry, Command, GridPos, SourceId, SourceSnapshot};

/// Replenishment system emitting spawn requests for starved sources.
#[derive(Clone, Copy, Debug, Default)]
pub struct Replenishment;

impl Replenishment {
    /// Creates a new replenishment system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits one [`Command::SpawnInstance`] per source that has no live
    /// instance and whose rotated footprint is entirely placeable. The cell
    /// the source itself occupies is exempt from the check, since every
    /// footprint covers its own base.
    ///
    /// A source with a blocked footprint is skipped silently this tick and
    /// retried on the next one.
    pub fn handle<H, P>(
        &self,
        sources: &[SourceSnapshot],
        mut has_instance: H,
        mut placeable: P,
        out: &mut Vec<Command>,
    ) where
        H: FnMut(SourceId) -> bool,
        P: FnMut(GridPos) -> bool,
    {
        for source in sources {
            if has_instance(source.id) {
                continue;
            }
            let footprint = geometry::footprint(source.kind, source.base, source.facing);
            if footprint
                .iter()
                .all(|cell| *cell == source.base || placeable(*cell))
            {
                out.push(Command::SpawnInstance { source: source.id });
            }
        }
    }
}
