//! Output generation for the product graph.
//!
//! # Submodules
//!
//! - [`rdf_xml`]: serializes the graph as RDF/XML and saves it without
//!   overwriting earlier runs
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── output.xml      # first run
//! ├── output_2.xml    # second run
//! └── output_3.xml    # ...
//! ```

pub mod rdf_xml;
