#![doc(html_root_url = "https://docs.rs/places-explorer/0.1.0")]

/*!
# Places Explorer

A library that keeps a list of nearby places in sync with the region a map shows.

## Usage

Add `places-explorer` to your dependencies in your project's `Cargo.toml`:

```toml
[dependencies]
futures = "0.3"
tokio = { version = "1", features = ["macros", "rt-multi-thread"] }
places-explorer = "0.1"
```

## Overview

The map reports camera moves, the user picks a category, a minimum rating or a place,
and the library decides when to fetch, which fetch still matters and what to show.

Here is a basic example that lists the hotels around the default location:

```rust,no_run
use futures::stream;
use places_explorer::bounds::WebMercator;
use places_explorer::types::Category;
use places_explorer::{Config, Driver, Event};

# #[tokio::main]
# async fn main() {
let config = Config::from_env().unwrap();
let conn = hyper_tls::HttpsConnector::new();
let client = hyper_pkg::Client::builder().build::<_, hyper_pkg::Body>(conn);
let mut driver = Driver::from_config(&config, client, WebMercator::new(800., 600.)).unwrap();

let events = stream::iter(vec![Event::CategoryChanged(Category::Hotels)]);
driver
    .run(events, |view| {
        if !view.loading {
            for place in view.places {
                println!("{} ({:?})", place.name, place.rating);
            }
        }
    })
    .await;
# }
```

`ViewOrchestrator` can also be used on its own. It never performs I/O: every
trigger returns the `FetchCycle` to perform, and `ViewOrchestrator::complete`
takes its outcome back.
*/

#[cfg(feature = "hyper")]
extern crate hyper_pkg;

#[macro_use]
mod util;

pub mod bounds;
pub mod config;
pub mod error;
pub mod filter;
#[cfg(feature = "hyper")]
pub mod hyper;
pub mod orchestrator;
pub mod place;
pub mod selection;
pub mod types;

mod cancel;
mod driver;
mod fetcher;
mod gzip;

pub use crate::bounds::{BoundsTracker, MapHandle};
pub use crate::cancel::CancelToken;
pub use crate::config::Config;
pub use crate::driver::{Driver, Event};
pub use crate::error::Error;
pub use crate::fetcher::{FetchOutcome, FuturePlaces, PlacesFetcher};
pub use crate::filter::{filter, RatingThreshold};
pub use crate::orchestrator::{FetchCycle, View, ViewOrchestrator};
pub use crate::place::Place;
pub use crate::selection::SelectionLink;
