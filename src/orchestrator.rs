//! The state machine keeping the displayed places in sync with the map.
//!
//! `ViewOrchestrator` does no I/O. Triggers that need data return a `FetchCycle`
//! for the caller to run, and the caller reports how it ended through
//! `ViewOrchestrator::complete`. Issuing a cycle cancels the token of the one in
//! flight, and only the outcome of the most recently issued cycle is ever
//! committed, whatever order the outcomes arrive in.

use std::fmt::{self, Display, Formatter};

use crate::cancel::CancelToken;
use crate::fetcher::FetchOutcome;
use crate::filter::{self, RatingThreshold};
use crate::place::{self, Marker, Place};
use crate::selection::{Displayed, SelectionLink};
use crate::types::{BoundingBox, Category, Theme};

/// Identifies a `FetchCycle`. Later cycles have greater ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(u64);

/// One request for the places of a category within a bounding box.
#[derive(Clone, Debug)]
pub struct FetchCycle {
    pub id: CycleId,
    pub category: Category,
    pub bounds: BoundingBox,
    /// Cancelled as soon as a newer cycle is issued.
    pub token: CancelToken,
}

/// The result of reporting the outcome of a `FetchCycle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The places were committed and are displayed now.
    Committed,
    /// The fetch failed. The places displayed before are kept.
    Failed,
    /// The cycle had been superseded or cancelled. Nothing changed.
    Discarded,
}

/// Owns the state behind the place list and the map markers.
#[derive(Debug)]
pub struct ViewOrchestrator {
    category: Category,
    threshold: RatingThreshold,
    bounds: Option<BoundingBox>,
    places: Vec<Place>,
    filtered: Vec<Place>,
    selection: SelectionLink,
    in_flight: Option<(CycleId, CancelToken)>,
    next_cycle: u64,
    failure: Option<String>,
    theme: Theme,
}

/// A snapshot of what the list and the map should show.
#[derive(Clone, Debug)]
pub struct View<'a> {
    /// The places to list, in order.
    pub places: &'a [Place],
    /// Markers for the listed places that have a usable coordinate.
    pub markers: Vec<Marker>,
    /// Index into `places` of the selected place.
    pub selected: Option<usize>,
    pub loading: bool,
    pub category: Category,
    pub threshold: RatingThreshold,
    pub theme: Theme,
    /// Why the last fetch failed, until a fetch succeeds.
    pub failure: Option<&'a str>,
}

impl ViewOrchestrator {
    pub fn new(category: Category, theme: Theme) -> Self {
        ViewOrchestrator {
            category,
            threshold: RatingThreshold::Unset,
            bounds: None,
            places: Vec::new(),
            filtered: Vec::new(),
            selection: SelectionLink::new(),
            in_flight: None,
            next_cycle: 0,
            failure: None,
            theme,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn threshold(&self) -> RatingThreshold {
        self.threshold
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// `true` while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// All the places of the last committed fetch.
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// The collection shown in the list and on the map: the places passing the
    /// rating threshold, or all of them if none does.
    pub fn displayed(&self) -> Displayed<'_> {
        Displayed::new(
            shown(&self.places, &self.filtered),
            self.selection.generation(),
        )
    }

    /// The selected place, if any.
    pub fn selected(&self) -> Option<&Place> {
        self.selection.resolve(self.displayed())
    }

    pub fn view(&self) -> View<'_> {
        let displayed = self.displayed();
        View {
            places: displayed.places,
            markers: place::markers(displayed.places),
            selected: self.selection.index(),
            loading: self.is_loading(),
            category: self.category,
            threshold: self.threshold,
            theme: self.theme,
            failure: self.failure.as_deref(),
        }
    }

    /// The user picked a category.
    ///
    /// Returns the cycle to run, unless the map has not reported its bounds yet.
    /// A fetch for the same category is restarted rather than reused.
    pub fn set_category(&mut self, category: Category) -> Option<FetchCycle> {
        self.category = category;
        let bounds = self.bounds?;
        Some(self.issue(bounds))
    }

    /// The map settled on a new region. `None` means the map could not tell its
    /// bounds yet, which is ignored.
    pub fn on_bounds_settled(&mut self, bounds: Option<BoundingBox>) -> Option<FetchCycle> {
        let bounds = bounds?;
        if !bounds.is_well_formed() {
            tracing::debug!(%bounds, "ignoring malformed bounds");
            return None;
        }
        self.bounds = Some(bounds);
        Some(self.issue(bounds))
    }

    /// The user changed the minimum rating. Refilters the places at hand.
    pub fn set_rating(&mut self, threshold: RatingThreshold) {
        self.threshold = threshold;
        self.refilter();
    }

    /// A marker was clicked. Returns the place it stands for.
    pub fn select_marker(&mut self, index: usize) -> Option<&Place> {
        let generation = self.selection.generation();
        let places = shown(&self.places, &self.filtered);
        self.selection.select(index, Displayed::new(places, generation))
    }

    /// A list entry was clicked. Entries and markers share indices.
    pub fn select_list_entry(&mut self, index: usize) -> Option<&Place> {
        let generation = self.selection.generation();
        let places = shown(&self.places, &self.filtered);
        self.selection
            .select_list_entry(index, Displayed::new(places, generation))
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggle();
        self.theme
    }

    /// Reports how the fetch of cycle `id` ended.
    ///
    /// A current cycle whose token was cancelled ends without committing
    /// anything, but it still clears the loading flag.
    pub fn complete<E: Display>(&mut self, id: CycleId, outcome: FetchOutcome<E>) -> Completion {
        let cancelled = match self.in_flight {
            Some((current, ref token)) if current == id => token.is_cancelled(),
            _ => {
                tracing::trace!(cycle = %id, "discarding the outcome of a superseded cycle");
                return Completion::Discarded;
            }
        };
        self.in_flight = None;

        match outcome {
            _ if cancelled => {
                tracing::trace!(cycle = %id, "current fetch was cancelled");
                Completion::Discarded
            }
            FetchOutcome::Places(places) => {
                tracing::debug!(cycle = %id, count = places.len(), "committing places");
                self.failure = None;
                self.places = places;
                self.threshold = RatingThreshold::Unset;
                self.refilter();
                Completion::Committed
            }
            FetchOutcome::Failed(e) => {
                tracing::warn!(cycle = %id, error = %e, "failed to fetch places");
                self.failure = Some(e.to_string());
                Completion::Failed
            }
            FetchOutcome::Cancelled => {
                tracing::trace!(cycle = %id, "fetch cancelled");
                Completion::Discarded
            }
        }
    }

    fn issue(&mut self, bounds: BoundingBox) -> FetchCycle {
        if let Some((previous, token)) = self.in_flight.take() {
            tracing::debug!(cycle = %previous, "cancelling superseded fetch");
            token.cancel();
        }

        let id = CycleId(self.next_cycle);
        self.next_cycle += 1;
        let token = CancelToken::new();
        self.in_flight = Some((id, token.clone()));
        self.selection.clear();
        self.threshold = RatingThreshold::Unset;
        self.refilter();
        tracing::debug!(cycle = %id, category = %self.category, %bounds, "issuing fetch");

        FetchCycle {
            id,
            category: self.category,
            bounds,
            token,
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter::filter(&self.places, self.threshold);
        self.selection.replace();
    }
}

fn shown<'a>(places: &'a [Place], filtered: &'a [Place]) -> &'a [Place] {
    if filtered.is_empty() {
        places
    } else {
        filtered
    }
}

impl Default for ViewOrchestrator {
    fn default() -> Self {
        ViewOrchestrator::new(Category::default(), Theme::default())
    }
}

impl Display for CycleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use crate::error::Error;
    use crate::types::{Coordinate, StatusCode};

    type Outcome = FetchOutcome<Infallible>;

    fn bbox(ne: f64) -> BoundingBox {
        BoundingBox::new(Coordinate::new(0., 0.), Coordinate::new(ne, ne))
    }

    fn place(name: &str, rating: f64) -> Place {
        Place {
            id: None,
            name: name.to_owned(),
            category: Category::Restaurants,
            rating: Some(rating),
            coordinate: Some(Coordinate::new(0.5, 0.5)),
            photo: None,
        }
    }

    fn names(o: &ViewOrchestrator) -> Vec<String> {
        o.view().places.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn no_fetch_before_bounds() {
        let mut o = ViewOrchestrator::default();
        assert!(o.on_bounds_settled(None).is_none());
        assert!(o.set_category(Category::Hotels).is_none());
        assert_eq!(o.category(), Category::Hotels);
        assert!(!o.is_loading());

        let cycle = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        assert_eq!(cycle.category, Category::Hotels);
        assert!(o.is_loading());
    }

    #[test]
    fn malformed_bounds_are_ignored() {
        let mut o = ViewOrchestrator::default();
        let bad = BoundingBox::new(Coordinate::new(1., 0.), Coordinate::new(0., 1.));
        assert!(o.on_bounds_settled(Some(bad)).is_none());
        assert_eq!(o.bounds(), None);
    }

    #[test]
    fn rating_and_bounds() {
        let mut o = ViewOrchestrator::default();
        let first = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        let places = vec![place("a", 4.5), place("b", 3.0)];
        assert_eq!(o.complete(first.id, Outcome::Places(places)), Completion::Committed);
        assert!(!o.is_loading());

        o.set_rating(RatingThreshold::Above(3.));
        assert_eq!(names(&o), ["a"]);
        assert!(!o.is_loading());

        o.set_rating(RatingThreshold::Above(0.));
        assert_eq!(names(&o), ["a", "b"]);

        o.set_rating(RatingThreshold::Above(3.));
        let second = o.on_bounds_settled(Some(bbox(2.))).unwrap();
        assert!(second.id > first.id);
        assert_eq!(o.threshold(), RatingThreshold::Unset);
        assert_eq!(names(&o), ["a", "b"]);
        assert!(o.is_loading());
    }

    #[test]
    fn last_issued_wins() {
        let mut o = ViewOrchestrator::default();
        let a = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        let b = o.on_bounds_settled(Some(bbox(2.))).unwrap();
        assert!(a.token.is_cancelled());
        assert!(!b.token.is_cancelled());

        let b_places = vec![place("from b", 4.)];
        assert_eq!(o.complete(b.id, Outcome::Places(b_places)), Completion::Committed);
        let a_places = vec![place("from a", 5.)];
        assert_eq!(o.complete(a.id, Outcome::Places(a_places)), Completion::Discarded);

        assert_eq!(names(&o), ["from b"]);
        assert!(!o.is_loading());
    }

    #[test]
    fn stale_outcome_while_loading() {
        let mut o = ViewOrchestrator::default();
        let a = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        let b = o.set_category(Category::Hotels).unwrap();
        assert_eq!(o.complete(a.id, Outcome::Places(vec![place("a", 1.)])), Completion::Discarded);
        assert_eq!(o.complete(a.id, Outcome::Cancelled), Completion::Discarded);
        assert!(o.is_loading());
        assert!(o.places().is_empty());

        assert_eq!(o.complete(b.id, Outcome::Places(vec![place("b", 1.)])), Completion::Committed);
        assert_eq!(names(&o), ["b"]);
    }

    #[test]
    fn cancelled_current_cycle_stops_loading() {
        let mut o = ViewOrchestrator::default();
        let a = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        o.complete(a.id, Outcome::Places(vec![place("kept", 4.)]));

        let b = o.on_bounds_settled(Some(bbox(2.))).unwrap();
        b.token.cancel();
        assert_eq!(o.complete(b.id, Outcome::Cancelled), Completion::Discarded);
        assert!(!o.is_loading());
        assert_eq!(names(&o), ["kept"]);

        // Data arriving for a cancelled cycle is not committed either.
        let c = o.on_bounds_settled(Some(bbox(3.))).unwrap();
        c.token.cancel();
        assert_eq!(o.complete(c.id, Outcome::Places(vec![place("late", 5.)])), Completion::Discarded);
        assert!(!o.is_loading());
        assert_eq!(names(&o), ["kept"]);
        assert_eq!(o.complete(c.id, Outcome::Cancelled), Completion::Discarded);
    }

    #[test]
    fn same_category_restarts() {
        let mut o = ViewOrchestrator::default();
        o.on_bounds_settled(Some(bbox(1.))).unwrap();
        let a = o.set_category(Category::Restaurants).unwrap();
        let b = o.set_category(Category::Restaurants).unwrap();
        assert!(a.token.is_cancelled());
        assert_ne!(a.id, b.id);
        assert_eq!(a.bounds, b.bounds);
    }

    #[test]
    fn failure_keeps_places() {
        let mut o = ViewOrchestrator::default();
        let a = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        o.complete(a.id, Outcome::Places(vec![place("kept", 4.)]));

        let b = o.on_bounds_settled(Some(bbox(2.))).unwrap();
        let failed = Outcome::Failed(Error::Http(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(o.complete(b.id, failed), Completion::Failed);
        assert!(!o.is_loading());
        assert_eq!(names(&o), ["kept"]);
        assert!(o.view().failure.is_some());

        let c = o.on_bounds_settled(Some(bbox(3.))).unwrap();
        o.complete(c.id, Outcome::Places(vec![]));
        assert_eq!(o.view().failure, None);
    }

    #[test]
    fn selection_is_invalidated() {
        let mut o = ViewOrchestrator::default();
        let a = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        o.complete(a.id, Outcome::Places(vec![place("a0", 4.), place("a1", 3.)]));

        assert_eq!(o.select_marker(1).map(|p| p.name.as_str()), Some("a1"));
        assert_eq!(o.view().selected, Some(1));
        assert!(o.select_marker(7).is_none());
        assert_eq!(o.selected().map(|p| p.name.as_str()), Some("a1"));

        let b = o.on_bounds_settled(Some(bbox(2.))).unwrap();
        assert!(o.selected().is_none());
        o.complete(b.id, Outcome::Places(vec![place("b0", 4.), place("b1", 3.)]));
        assert!(o.selected().is_none());
        assert_eq!(o.view().selected, None);

        assert_eq!(o.select_list_entry(0).map(|p| p.name.as_str()), Some("b0"));
        assert_eq!(o.view().selected, Some(0));
        assert_eq!(o.selected().map(|p| p.name.as_str()), Some("b0"));
        assert!(o.select_list_entry(99).is_none());
        assert_eq!(o.view().selected, Some(0));
        o.set_rating(RatingThreshold::Above(3.5));
        assert!(o.selected().is_none());
    }

    #[test]
    fn markers_skip_unusable_coordinates() {
        let mut o = ViewOrchestrator::default();
        let a = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        let mut broken = place("broken", 4.);
        broken.coordinate = Some(Coordinate::new(0.5, f64::NAN));
        o.complete(a.id, Outcome::Places(vec![broken, place("ok", 4.)]));

        let view = o.view();
        assert_eq!(view.places.len(), 2);
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].index, 1);
    }

    #[test]
    fn nothing_passes_threshold() {
        let mut o = ViewOrchestrator::default();
        let a = o.on_bounds_settled(Some(bbox(1.))).unwrap();
        o.complete(a.id, Outcome::Places(vec![place("a", 2.), place("b", 3.)]));
        o.set_rating(RatingThreshold::Above(4.));
        assert_eq!(names(&o), ["a", "b"]);
    }

    #[test]
    fn theme() {
        let mut o = ViewOrchestrator::default();
        assert_eq!(o.toggle_theme(), Theme::Dark);
        assert_eq!(o.view().theme, Theme::Dark);
    }
}
