// This is free and unencumbered software released into the public domain.
//
// Anyone is free to copy, modify, publish, use, compile, sell, or
// distribute this software, either in source code form or as a compiled
// binary, for any purpose, commercial or non-commercial, and by any
// means.
//
// In jurisdictions that recognize copyright laws, the author or authors
// of this software dedicate any and all copyright interest in the
// software to the public domain. We make this dedication for the benefit
// of the public at large and to the detriment of our heirs and
// successors. We intend this dedication to be an overt act of
// relinquishment in perpetuity of all present and future rights to this
// software under copyright law.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS BE LIABLE FOR ANY CLAIM, DAMAGES OR
// OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE,
// ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR
// OTHER DEALINGS IN THE SOFTWARE.
//
// For more information, please refer to <http://unlicense.org/>

// This line shouldn't be necessary in a real project.
extern crate hyper_pkg as hyper;

use std::error::Error;

use futures::stream;
use places_explorer::bounds::{Viewport, WebMercator};
use places_explorer::types::Category;
use places_explorer::{Config, Driver, Event, RatingThreshold, View};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let client = hyper::Client::builder().build::<_, hyper::Body>(hyper_tls::HttpsConnector::new());
    let mut driver = Driver::from_config(&config, client, WebMercator::new(1280., 800.))?;

    // A scripted session: browse hotels, keep the well-rated ones, pick the first
    // one, then search for another city.
    let events = stream::iter(vec![
        Event::CategoryChanged(Category::Hotels),
        Event::RatingChanged("4".parse::<RatingThreshold>()?),
        Event::MarkerClicked(0),
        Event::GeocoderResult(Viewport::new(21.9588, 96.0891, 12.)),
        Event::Settled,
    ]);

    driver.run(events, print).await;

    Ok(())
}

fn print(view: &View<'_>) {
    if view.loading {
        println!("loading {}...", view.category);
        return;
    }
    if let Some(failure) = view.failure {
        println!("failed to load places: {}", failure);
    }

    let rated = if view.threshold.is_set() {
        format!(" rated above {}", view.threshold)
    } else {
        String::new()
    };
    println!(
        "{} {}{} ({} on the map)",
        view.places.len(),
        view.category,
        rated,
        view.markers.len(),
    );
    for (i, place) in view.places.iter().enumerate() {
        let mark = if view.selected == Some(i) { '*' } else { ' ' };
        let rating = place.rating.map_or_else(|| "-".to_owned(), |r| r.to_string());
        println!("{} {:>3} {} {}", mark, rating, place.name, place.photo_url());
    }
}
