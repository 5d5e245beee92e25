/// A pure, read-only view computed from a collection.
///
/// Implementations must be deterministic: identical collections produce
/// identical output, with no hidden state and no I/O.
pub trait Projection<E> {
    type Output;

    fn project(&self, records: &[E]) -> Self::Output;
}
