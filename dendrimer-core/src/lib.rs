//! Dendrimer synchronizes a live, in-memory object tree with a generic
//! self-describing document, in both directions, without per-type
//! serialization code.
//!
//! Core concepts:
//! - **Monomer**: one node of the tree — named scalar attributes, an open
//!   dynamic attribute mapping, ordered children, a display name and a
//!   type tag
//! - **Value**: the generic document — Scalar | Map | List, with
//!   insertion-ordered maps
//! - **Folding**: repeated same-key entries collapse into a list; single
//!   entries stay bare
//! - **Factory**: type-key to constructor registry, consulted when
//!   reconciliation finds no existing child to update
//!
//! # Example
//!
//! ```
//! use dendrimer_core::{Backbone, Factory, Monomer, encode, reconcile, EncodeOptions};
//! use dendrimer_core::{Scalar, Value};
//!
//! #[derive(Debug, Default, Monomer)]
//! struct Person {
//!     #[monomer(backbone)]
//!     backbone: Backbone,
//!     age: i64,
//! }
//!
//! let mut jane = Person { age: 41, ..Person::default() };
//! jane.backbone.set_name("Jane");
//!
//! let doc = encode(&jane, &EncodeOptions::default());
//! assert_eq!(doc.as_map().unwrap().get("age"), Some(&Value::from(41i64)));
//!
//! let mut factory = Factory::new();
//! factory.register_default::<Person>("Person");
//! let report = reconcile(&mut jane, &doc, &factory);
//! assert!(report.is_clean());
//! ```

mod encode;
mod factory;
mod node;
mod reconcile;
mod value;

pub use indexmap::IndexMap;

pub use encode::{Depth, EncodeOptions, encode, encode_list};
pub use factory::{Factory, FactoryError};
pub use node::{AttrError, AttrSpec, AttrValue, Backbone, Monomer, NAME_KEY};
pub use reconcile::{DropReason, Dropped, Report, reconcile, reconcile_list};
pub use value::{Scalar, Value, ValueMap, fold};

#[cfg(feature = "derive")]
pub use dendrimer_derive::Monomer;
