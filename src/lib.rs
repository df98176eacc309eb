//! Implements an adaptive, arena-allocated quadtree which indexes entities by their geographic bounding boxes.
//!
//! # Overview
//! [`QuadBuckets`] partitions the world, from -180 to 180 degrees of longitude and from -90 to 90 degrees of latitude, into recursively subdivided quadrants. Entities are kept in *buckets*: every entity lands in the deepest existing bucket whose quadrant contains its whole bounding box, so entities crossing a quadrant boundary stay closer to the root. A bucket which overflows is split into up to four child buckets, and buckets which become empty are unlinked again, keeping the tree proportional to the data it holds.
//!
//! The index answers *intersection queries*: given a search box, it returns every entity whose bounding box intersects it, using closed intervals so that touching boxes count. Since consecutive queries tend to look at nearby areas, the index remembers where the previous search ended up and starts the next one from there.
//!
//! Buckets live in an arena (a [`SparseVec`] from the `granite` crate) and link to each other by index. Unlinking a bucket leaves a hole in the arena, which gets reused when new buckets are created.
//!
//! # Example
//! ```rust
//! use quadbuckets::{QuadBuckets, BBox, LatLon};
//!
//! let mut buckets = QuadBuckets::new();
//! buckets.add(BBox::from_coords(2.25, 48.8, 2.45, 48.9)); // Paris
//! buckets.add(BBox::from_coords(-74.05, 40.6, -73.9, 40.9)); // New York
//! buckets.add(LatLon::new(51.5, -0.12).into()); // London
//!
//! let europe = BBox::from_coords(-10.0, 35.0, 30.0, 60.0);
//! assert_eq!(buckets.search(&europe).len(), 2);
//! ```
//!
//! # Storing custom types
//! Anything implementing [`Bounded`] can be stored. Equality, used by removal and containment checks, is taken from [`PartialEq`], and equal entities may be stored several times.
//!
//! # Feature flags
//! - `unwind_safety` (**enabled by default**) — terminates the process instead of unwinding when the tree is found to be corrupted, preventing unwinders from observing the broken structure.
//!
//! # Logging
//! The crate reports through the [`tracing`] facade: bucket splits and unlinks at the `TRACE` level, search boxes falling outside the world at `DEBUG`, and tree corruption at `ERROR` right before terminating. Nothing is printed unless the application installs a subscriber.
//!
//! [`QuadBuckets`]: quadbuckets/struct.QuadBuckets.html " "
//! [`Bounded`]: bbox/trait.Bounded.html " "
//! [`PartialEq`]: https://doc.rust-lang.org/std/cmp/trait.PartialEq.html " "
//! [`SparseVec`]: https://docs.rs/granite/*/granite/type.SparseVec.html " "
//! [`tracing`]: https://docs.rs/tracing " "

#![warn(
    rust_2018_idioms,
    clippy::cargo,
    clippy::nursery,
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    variant_size_differences,
    clippy::cast_lossless,
    clippy::checked_conversions,
    clippy::copy_iterator,
    clippy::expl_impl_clone_on_copy,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
    clippy::filter_map_next,
    clippy::map_flatten,
    clippy::map_unwrap_or,
    clippy::fn_params_excessive_bools,
    clippy::implicit_saturating_sub,
    clippy::inefficient_to_string,
    clippy::invalid_upcast_comparisons,
    clippy::items_after_statements,
    clippy::large_stack_arrays,
    clippy::let_unit_value,
    clippy::macro_use_imports,
    clippy::match_same_arms,
    clippy::match_wild_err_arm,
    clippy::match_wildcard_for_single_variants,
    clippy::mut_mut,
    clippy::needless_continue,
    clippy::needless_pass_by_value,
    clippy::option_option,
    clippy::range_plus_one,
    clippy::range_minus_one,
    clippy::redundant_closure_for_method_calls,
    clippy::same_functions_in_if_condition,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::string_add_assign,
    clippy::too_many_lines,
    clippy::type_repetition_in_bounds,
    clippy::unicode_not_nfc,
    clippy::unnested_or_patterns,
    clippy::unused_self,
    clippy::used_underscore_binding,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::decimal_literal_representation,
    clippy::get_unwrap,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unneeded_field_pattern,
    clippy::unwrap_used, // Only .expect() allowed
    clippy::use_debug,
)]
#![deny(
    anonymous_parameters,
    bare_trait_objects,
    clippy::exit,
)]
#![allow(clippy::use_self)]

pub mod bbox;
pub use bbox::{BBox, LatLon, Bounded};

pub mod quad_tiling;

pub mod config;
pub use config::{Config, ConfigError};

pub mod quadbuckets;
pub use quadbuckets::QuadBuckets;

/// A prelude for using the crate, containing the most used types in a renamed form for safe glob-importing.
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::bbox::{
        BBox as GeoBBox,
        LatLon,
        Bounded as GeoBounded,
    };
    #[doc(no_inline)]
    pub use crate::config::Config as QuadBucketsConfig;
    #[doc(no_inline)]
    pub use crate::quadbuckets::{
        QuadBuckets,
        NodeRef as QuadBucketsNodeRef,
    };
}

pub(crate) mod util;
