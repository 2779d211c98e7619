//! Resolver Component
//!
//! Decides which units a build needs and in which order they load.
//!
//! # Overview
//!
//! - [`Meta`], [`Unit`] - Declared dependencies and scope facts of a unit
//! - [`Universe`] - All known units
//! - [`Resolver`] - Direct dependencies and their transitive closure
//! - [`Sorter`] - Load order honoring break edges
//! - [`DependencyError`] - Missing units and unbroken cycles
//!
//! # Example
//!
//! ```
//! use resolver::{Meta, Resolver, Sorter, Unit, Universe};
//!
//! let mut universe = Universe::new();
//! universe.add(Unit::new("app.Main", Meta::new().with_require("app.ui.*")));
//! universe.add(Unit::new("app.ui.Button", Meta::new().with_require("app.Base")));
//! universe.add(Unit::new("app.Base", Meta::new()));
//!
//! let needed = Resolver::new(&universe).resolve(["app.Main"]).unwrap();
//! let order = Sorter::new(&universe).sort(&needed).unwrap();
//! assert_eq!(order, vec!["app.Base", "app.ui.Button", "app.Main"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod resolver;
pub mod sorter;
pub mod unit;
pub mod universe;

pub use error::{DependencyError, DependencyResult};
pub use resolver::Resolver;
pub use sorter::Sorter;
pub use unit::{Meta, Unit};
pub use universe::Universe;
