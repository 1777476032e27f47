use odbstat_types::ObjectId;

use crate::garbage::GarbageReporter;
use crate::pack::PackSummary;

/// Read-only view of the packed objects of a repository.
///
/// Implementations load lazily: nothing is read from disk until the first
/// call, and the load happens at most once. Any garbage discovered while
/// loading or opening indexes goes to the reporter passed to that call.
pub trait PackDatabase {
    /// Discover packs if that has not happened yet.
    fn prepare(&mut self, reporter: &mut dyn GarbageReporter);

    /// Whether any pack contains `id`. Packs whose index cannot be opened
    /// are skipped.
    fn contains_object(&mut self, id: &ObjectId, reporter: &mut dyn GarbageReporter) -> bool;

    /// Summaries of every pack whose index opens.
    fn summaries(&mut self, reporter: &mut dyn GarbageReporter) -> Vec<PackSummary>;
}
