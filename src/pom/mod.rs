//! The POM pipeline: parsing, discovery, aggregation, synthesis, rewriting

pub mod aggregate;
pub mod discovery;
pub mod gav;
pub mod parser;
pub mod resolver;
pub mod rewrite;
pub mod synthesize;
mod xml;

pub use aggregate::{Aggregation, AggregationOptions, CoordinateAggregator, SelectionMode, SkippedModule};
pub use discovery::{DiscoveryWarning, ModuleDiscoverer, ModuleDiscovery, PomDescriptor};
pub use gav::{Gav, PartialGav, dedupe_coordinates};
pub use parser::{
    GavParse, ModulesParse, parse_for_gav, parse_for_modules, parse_for_packaging,
};
pub use resolver::{AttributeResolver, Unresolved, resolve_coordinates, resolve_externally};
pub use rewrite::{
    DependencyRewriter, DependencyVersionSetter, FallbackReport, PomEdit, RewriteBlocker,
    RewriteReport, UnresolvedModule, VersionChange, VersionTable, rewrite_pom_xml,
};
pub use synthesize::{AggregatorProject, synthesize};
