//! Links between map markers and list entries.
//!
//! Markers and list entries both index into the displayed collection of places.
//! Every time that collection is replaced it gets a new `Generation`, and a
//! selection recorded against an older generation never resolves.

use crate::place::Place;

/// Identifies one version of the displayed collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Generation(u64);

/// A displayed collection of places together with its generation.
#[derive(Clone, Copy, Debug)]
pub struct Displayed<'a> {
    pub places: &'a [Place],
    pub generation: Generation,
}

/// The selected place, shared by the map and the list.
#[derive(Clone, Debug, Default)]
pub struct SelectionLink {
    generation: Generation,
    selected: Option<(usize, Generation)>,
}

impl<'a> Displayed<'a> {
    pub fn new(places: &'a [Place], generation: Generation) -> Self {
        Displayed { places, generation }
    }
}

impl SelectionLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation of the collection currently displayed.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Records that the displayed collection was replaced, clearing the selection.
    pub fn replace(&mut self) -> Generation {
        self.generation = Generation(self.generation.0 + 1);
        self.selected = None;
        self.generation
    }

    /// Records a click on the marker at `index`.
    ///
    /// Returns the selected place, or `None` if `index` is out of bounds or
    /// `displayed` is not the current collection, in which case nothing is recorded.
    pub fn select<'a>(&mut self, index: usize, displayed: Displayed<'a>) -> Option<&'a Place> {
        if displayed.generation != self.generation {
            return None;
        }
        let place = displayed.places.get(index)?;
        self.selected = Some((index, displayed.generation));
        Some(place)
    }

    /// Records a click on the list entry at `index`. Entries and markers share indices.
    pub fn select_list_entry<'a>(
        &mut self,
        index: usize,
        displayed: Displayed<'a>,
    ) -> Option<&'a Place> {
        self.select(index, displayed)
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Index of the selected marker and list entry, if the selection is still current.
    pub fn index(&self) -> Option<usize> {
        match self.selected {
            Some((index, generation)) if generation == self.generation => Some(index),
            _ => None,
        }
    }

    /// Looks up the selected place in `displayed`.
    pub fn resolve<'a>(&self, displayed: Displayed<'a>) -> Option<&'a Place> {
        match self.selected {
            Some((index, generation)) if generation == displayed.generation => {
                displayed.places.get(index)
            }
            _ => None,
        }
    }
}
