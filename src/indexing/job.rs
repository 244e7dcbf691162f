//! A unit of indexing work executed on the worker pool.

use tracing::{debug, warn};

use crate::parsing::visitor::{add_filename_symbol, visit_cursors, visit_inclusions, CrossRefSink};
use crate::parsing::{AcquireOptions, Severity, TranslationUnit, UnitCache, UnitOrigin};
use crate::storage::AccumulatorSet;
use crate::types::{IndexMode, JobId};

/// One input file to index, plus everything the worker needs to run it.
#[derive(Debug)]
pub(crate) struct IndexJob {
    pub id: JobId,
    pub input: Vec<u8>,
    pub args: Vec<Vec<u8>>,
    pub mode: IndexMode,
}

impl IndexJob {
    /// Parse the input and merge the extracted cross-references into the
    /// shared accumulators.
    ///
    /// Data is only extracted when the unit cache actually re-parsed the
    /// source; a cached AST was already indexed by the run that produced
    /// it. Diagnostics never fail the job.
    pub fn run<C: UnitCache>(&self, cache: &C, accumulators: &AccumulatorSet) {
        let options = AcquireOptions {
            source: true,
            ast: true,
            force: self.mode == IndexMode::Force,
        };
        let Some(cached) = cache.acquire(&self.input, &self.args, options) else {
            debug!("got no unit for {}", String::from_utf8_lossy(&self.input));
            return;
        };

        debug!(
            "parsing {} as {}",
            String::from_utf8_lossy(&self.input),
            String::from_utf8_lossy(&cached.filename)
        );
        for diagnostic in cached.unit.diagnostics() {
            if diagnostic.severity >= Severity::Warning {
                warn!("clang: {}", diagnostic.message);
            }
        }

        if cached.origin != UnitOrigin::Source {
            return;
        }
        debug!(
            "reread {} from source, revisiting",
            String::from_utf8_lossy(&cached.filename)
        );

        // Include edges go straight to the shared accumulator; the other
        // three kinds stage locally and merge one mutex at a time.
        visit_inclusions(&cached.unit.inclusions(), &self.input, &accumulators.includes);

        let mut sink = CrossRefSink::default();
        visit_cursors(&cached.unit.cursor(), &mut sink);
        add_filename_symbol(&cached.filename, &mut sink.symbols);

        accumulators.definitions.merge_from(&mut sink.definitions);
        accumulators.references.merge_from(&mut sink.references);
        accumulators.symbols.merge_from(&mut sink.symbols);
    }
}
