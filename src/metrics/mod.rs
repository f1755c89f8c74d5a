/// Lending market metric core
///
/// Pipeline: raw record -> adapter field map -> unit normalizer -> rate
/// compounder -> metric assembler -> result table rows. The batch processor
/// runs the assembler over many records in parallel.
pub mod adapters;
pub mod assembler;
pub mod batch;
pub mod compounder;
pub mod normalizer;
pub mod registry;
pub mod table;
pub mod types;

pub use adapters::ProtocolAdapter;
pub use assembler::MetricAssembler;
pub use batch::{ process_batch, process_batch_with, BatchReport };
pub use compounder::{ annualize, compound };
pub use normalizer::{ normalize, normalize_scaled };
pub use registry::AdapterRegistry;
pub use table::{ to_rows, MetricRow, COLUMNS };
pub use types::{
    CanonicalField,
    ExtraFields,
    MetricRecord,
    NormalizedFields,
    RateBasis,
    RawFields,
    RawRecord,
    RawValue,
};
