//! Runs a `ViewOrchestrator` against a stream of UI events and an HTTP client.

use std::fmt::Display;
use std::future::Future;
use std::task::Poll;

use futures_core::Stream;
use futures_util::future::poll_fn;
use futures_util::stream::{FuturesUnordered, StreamExt};
use http::{Request, Response};
use http_body::Body;
use tower_service::Service;

use crate::bounds::{BoundsTracker, MapHandle, Viewport};
use crate::config::Config;
use crate::error::{ConfigError, Error};
use crate::fetcher::{FetchOutcome, FuturePlaces, PlacesFetcher};
use crate::filter::RatingThreshold;
use crate::orchestrator::{FetchCycle, View, ViewOrchestrator};
use crate::types::{Category, Coordinate};

/// Something the user or the map did.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The camera moved. The map keeps moving until `Settled`.
    ViewportChanged(Viewport),
    /// A place was picked in the geocoder search box.
    GeocoderResult(Viewport),
    /// The geolocation control reported where the user is.
    Geolocated(Coordinate),
    /// The map finished a pan, zoom or transition.
    Settled,
    CategoryChanged(Category),
    RatingChanged(RatingThreshold),
    MarkerClicked(usize),
    ListEntryClicked(usize),
    ThemeToggled,
}

/// Drives the explorer on a single task.
///
/// All state changes happen on the task polling `Driver::run`. The only thing
/// it waits on besides events is the fetches it issued.
pub struct Driver<S, H> {
    orchestrator: ViewOrchestrator,
    tracker: BoundsTracker,
    fetcher: PlacesFetcher,
    client: S,
    map: H,
}

enum Next<E> {
    Event(Event),
    EventsDone,
    Fetched(FetchCycle, FetchOutcome<E>),
}

impl<S, H: MapHandle> Driver<S, H> {
    pub fn new(fetcher: PlacesFetcher, client: S, map: H, initial: Viewport) -> Self {
        Driver {
            orchestrator: ViewOrchestrator::default(),
            tracker: BoundsTracker::new(initial),
            fetcher,
            client,
            map,
        }
    }

    /// Creates a driver with the settings of `config`.
    pub fn from_config(
        config: &Config,
        client: S,
        map: H,
    ) -> Result<Self, ConfigError> {
        let fetcher = PlacesFetcher::from_config(config)?;
        let mut driver = Driver::new(fetcher, client, map, config.viewport);
        driver.orchestrator = ViewOrchestrator::new(config.category, config.theme);
        Ok(driver)
    }

    pub fn orchestrator(&self) -> &ViewOrchestrator {
        &self.orchestrator
    }

    pub fn tracker(&self) -> &BoundsTracker {
        &self.tracker
    }

    /// Mounts the map, then handles `events` until the stream ends and the
    /// fetch in flight, if any, has completed.
    ///
    /// `observer` is called with a fresh snapshot after every change of state.
    pub async fn run<St, F, ReqB, ResB>(&mut self, events: St, mut observer: F)
    where
        St: Stream<Item = Event>,
        F: FnMut(&View<'_>),
        S: Service<Request<ReqB>, Response = Response<ResB>>,
        S::Error: Display,
        ReqB: Default,
        ResB: Body,
        ResB::Error: Into<S::Error>,
    {
        futures_util::pin_mut!(events);
        let mut in_flight = FuturesUnordered::new();

        let mounted = self.tracker.on_settle(&self.map);
        if let Some(cycle) = self.orchestrator.on_bounds_settled(mounted) {
            if let Some(cycle) = self.ready_for::<ReqB, ResB>(cycle).await {
                in_flight.push(self.fetch::<ReqB, ResB>(cycle));
            }
        }
        observer(&self.orchestrator.view());

        let mut events_done = false;
        loop {
            let next = poll_fn(|cx| {
                if let Poll::Ready(Some((cycle, outcome))) = in_flight.poll_next_unpin(cx) {
                    return Poll::Ready(Some(Next::Fetched(cycle, outcome)));
                }
                if events_done {
                    return if in_flight.is_empty() {
                        Poll::Ready(None)
                    } else {
                        Poll::Pending
                    };
                }
                events.as_mut().poll_next(cx).map(|event| {
                    Some(match event {
                        Some(event) => Next::Event(event),
                        None => Next::EventsDone,
                    })
                })
            })
            .await;

            match next {
                Some(Next::Fetched(cycle, outcome)) => {
                    self.orchestrator.complete(cycle.id, outcome);
                }
                Some(Next::Event(event)) => {
                    if let Some(cycle) = self.handle(event) {
                        if let Some(cycle) = self.ready_for::<ReqB, ResB>(cycle).await {
                            in_flight.push(self.fetch::<ReqB, ResB>(cycle));
                        }
                    }
                }
                Some(Next::EventsDone) => {
                    events_done = true;
                    continue;
                }
                None => break,
            }

            observer(&self.orchestrator.view());
        }
    }

    /// Applies `event`, returning the fetch it calls for, if any.
    pub fn handle(&mut self, event: Event) -> Option<FetchCycle> {
        tracing::trace!(?event, "handling event");
        match event {
            Event::ViewportChanged(viewport) => {
                self.tracker.on_viewport_change(viewport);
                None
            }
            Event::GeocoderResult(viewport) => {
                self.tracker.on_geocoder_result(viewport);
                None
            }
            Event::Geolocated(position) => {
                self.tracker.on_geolocated(position);
                None
            }
            Event::Settled => {
                let bounds = self.tracker.on_settle(&self.map);
                self.orchestrator.on_bounds_settled(bounds)
            }
            Event::CategoryChanged(category) => self.orchestrator.set_category(category),
            Event::RatingChanged(threshold) => {
                self.orchestrator.set_rating(threshold);
                None
            }
            Event::MarkerClicked(index) => {
                self.orchestrator.select_marker(index);
                None
            }
            Event::ListEntryClicked(index) => {
                self.orchestrator.select_list_entry(index);
                None
            }
            Event::ThemeToggled => {
                self.orchestrator.toggle_theme();
                None
            }
        }
    }

    /// Waits for the client to accept a request for `cycle`.
    ///
    /// If the client fails, the cycle is completed as failed and `None` is returned.
    async fn ready_for<ReqB, ResB>(&mut self, cycle: FetchCycle) -> Option<FetchCycle>
    where
        S: Service<Request<ReqB>, Response = Response<ResB>>,
        S::Error: Display,
    {
        let client = &mut self.client;
        match poll_fn(|cx| Service::<Request<ReqB>>::poll_ready(client, cx)).await {
            Ok(()) => Some(cycle),
            Err(e) => {
                let outcome = FetchOutcome::Failed(Error::Service(e));
                self.orchestrator.complete(cycle.id, outcome);
                None
            }
        }
    }

    fn fetch<ReqB, ResB>(
        &mut self,
        cycle: FetchCycle,
    ) -> impl Future<Output = (FetchCycle, FetchOutcome<S::Error>)>
    where
        S: Service<Request<ReqB>, Response = Response<ResB>>,
        ReqB: Default,
        ResB: Body,
        ResB::Error: Into<S::Error>,
    {
        let places: FuturePlaces<S::Future, ResB> =
            self.fetcher.fetch_with_client::<&mut S, ReqB, ResB>(
                &mut self.client,
                cycle.category,
                cycle.bounds,
                cycle.token.clone(),
            );
        async move {
            let outcome = places.await;
            (cycle, outcome)
        }
    }
}
