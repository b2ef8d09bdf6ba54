//! Entity Portation - annotation-driven spreadsheet import and export
//!
//! Converts lists of entities into spreadsheet documents (CSV, XLSX, HTML,
//! XML) and builds entities back from CSV, XLS, XLSX or ODS files.
//!
//! # Features
//!
//! - Column discovery from registered properties and accessors
//! - Per-column labels, positions, visibility and value types
//! - Heterogeneous exports of classes sharing a common root
//! - Boolean labels, date formats and translated texts
//! - Lenient import with a report of unmapped cells
//!
//! # Example
//!
//! ```no_run
//! use entity_portation::registry::SchemaConfig;
//! use entity_portation::{Exporter, OutputType, Record};
//! use entity_portation::entity::entity_refs;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let config = SchemaConfig::from_file(Path::new("schema.yaml"))?;
//! let registry = Arc::new(config.to_registry()?);
//!
//! let people = vec![
//!     Record::new("Person").with("id", 1).with("lastname", "Doe"),
//! ];
//!
//! let mut exporter = Exporter::new(registry);
//! exporter.set_entities(entity_refs(&people), None, true)?;
//! exporter.save_as_file(OutputType::Csv, "people")?;
//! # Ok::<(), entity_portation::PortationError>(())
//! ```

pub mod cli;
pub mod convert;
pub mod document;
pub mod entity;
pub mod error;
pub mod http;
pub mod logging;
pub mod naming;
pub mod options;
pub mod portation;
pub mod reader;
pub mod registry;
pub mod schema;
pub mod translate;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use document::{Document, DocumentProperties, OutputType, Sheet};
pub use entity::{Entity, Record};
pub use error::{ErrorKind, PortationError, PortationResult};
pub use http::DownloadResponse;
pub use options::{Annotation, ColumnOptions};
pub use portation::{Exporter, Importer, NotFoundCell};
pub use registry::{ClassBuilder, ClassRegistry, EntityPortation};
pub use schema::Schema;
pub use translate::{Catalog, Translator};
pub use types::{ObjectValue, Portation, Value, ValueType};
