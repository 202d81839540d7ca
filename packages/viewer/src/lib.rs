#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! View synchronization for the SIF map.
//!
//! The controller owns the interactive state — active layer, current
//! date range — and reacts to user events by querying the layers and the
//! sounding store, then republishing complete results into two reactive
//! data sources the rendering layer observes. One event is processed at
//! a time, fully, before the next; source updates are all-or-nothing.

pub mod controller;
pub mod events;
pub mod sources;
pub mod throttle;

pub use controller::ViewController;
pub use events::ViewEvent;
pub use sources::{MapData, MapRegion, SeriesData, ViewSources};
pub use throttle::Throttle;
