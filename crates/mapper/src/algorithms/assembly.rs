use std::collections::{HashMap, VecDeque};

use geo_types::Coord;
use tracing::{debug, warn};

use crate::{
    error::Result,
    traits::ChainAssembler,
    types::{Chain, PointKey, SegmentMap},
};

/// Chain assembler backed by an endpoint index over an arena of chains.
///
/// Assumes marching-squares topology: at most two segment ends meet at any
/// point. Higher-degree vertices are logged and resolved first-match-wins.
#[derive(Debug, Clone, Default)]
pub struct EndpointIndexAssembler;

impl ChainAssembler for EndpointIndexAssembler {
    fn assemble(&self, segments: &SegmentMap) -> Result<Vec<Chain>> {
        Ok(assemble_chains(segments))
    }
}

/// Stitch segments into maximal chains.
///
/// Closed loops come first, in the order they closed, followed by chains
/// still open when the input ran out, in creation order.
pub fn assemble_chains(segments: &SegmentMap) -> Vec<Chain> {
    let mut arena = ChainArena::default();
    for (start, end) in segments.iter() {
        arena.link(start, end);
    }
    let chains = arena.into_chains();
    debug!(
        segments = segments.len(),
        chains = chains.len(),
        "assembled contour chains"
    );
    chains
}

type ChainHandle = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Head,
    Tail,
}

#[derive(Debug, Default)]
struct ChainArena {
    chains: Vec<Option<VecDeque<Coord<f64>>>>,
    open_start: HashMap<PointKey, ChainHandle>,
    open_end: HashMap<PointKey, ChainHandle>,
    finished: Vec<Chain>,
}

impl ChainArena {
    fn link(&mut self, start: Coord<f64>, end: Coord<f64>) {
        let start_key = PointKey::new(start);
        let end_key = PointKey::new(end);
        if start_key == end_key {
            return;
        }

        let at_start = self.take_open(start_key);
        let at_end = self.take_open(end_key);

        match (at_start, at_end) {
            (None, None) => {
                let handle = self.chains.len();
                self.chains.push(Some(VecDeque::from([start, end])));
                self.open_start.insert(start_key, handle);
                self.open_end.insert(end_key, handle);
            }
            (Some((handle, side)), None) => self.extend(handle, side, end),
            (None, Some((handle, side))) => self.extend(handle, side, start),
            (Some((a, _)), Some((b, _))) if a == b => self.close(a),
            (Some((a, side_a)), Some((b, side_b))) => self.join(a, side_a, b, side_b),
        }
    }

    /// Remove and return the open chain ending at `key`, if any.
    fn take_open(&mut self, key: PointKey) -> Option<(ChainHandle, Side)> {
        let found = match self.open_start.remove(&key) {
            Some(handle) => Some((handle, Side::Head)),
            None => self.open_end.remove(&key).map(|handle| (handle, Side::Tail)),
        };
        if found.is_some()
            && (self.open_start.contains_key(&key) || self.open_end.contains_key(&key))
        {
            warn!(?key, "more than two segment ends meet at one point");
        }
        found
    }

    fn chain_mut(&mut self, handle: ChainHandle) -> Option<&mut VecDeque<Coord<f64>>> {
        self.chains.get_mut(handle).and_then(Option::as_mut)
    }

    fn extend(&mut self, handle: ChainHandle, side: Side, point: Coord<f64>) {
        let Some(chain) = self.chain_mut(handle) else {
            return;
        };
        let key = PointKey::new(point);
        match side {
            Side::Head => {
                chain.push_front(point);
                self.open_start.insert(key, handle);
            }
            Side::Tail => {
                chain.push_back(point);
                self.open_end.insert(key, handle);
            }
        }
    }

    /// Both segment ends hit the same open chain: it becomes a loop.
    fn close(&mut self, handle: ChainHandle) {
        let Some(mut chain) = self.chains.get_mut(handle).and_then(Option::take) else {
            return;
        };
        if let Some(&first) = chain.front() {
            chain.push_back(first);
        }
        self.finished.push(chain.into());
    }

    /// Concatenate two open chains so the linking segment's ends are adjacent.
    fn join(&mut self, keep: ChainHandle, keep_side: Side, other: ChainHandle, other_side: Side) {
        let (Some(mut head), Some(mut tail)) = (
            self.chains.get_mut(keep).and_then(Option::take),
            self.chains.get_mut(other).and_then(Option::take),
        ) else {
            return;
        };

        // The surviving chain must end at the segment start, the consumed one
        // must begin at the segment end.
        if keep_side == Side::Head {
            head.make_contiguous().reverse();
        }
        if other_side == Side::Tail {
            tail.make_contiguous().reverse();
        }

        for key in [head.front(), tail.back()].into_iter().flatten().map(|&p| PointKey::new(p)) {
            self.unregister(key, keep);
            self.unregister(key, other);
        }

        head.extend(tail);
        if let (Some(&first), Some(&last)) = (head.front(), head.back()) {
            self.open_start.insert(PointKey::new(first), keep);
            self.open_end.insert(PointKey::new(last), keep);
        }
        self.chains[keep] = Some(head);
    }

    fn unregister(&mut self, key: PointKey, handle: ChainHandle) {
        if self.open_start.get(&key) == Some(&handle) {
            self.open_start.remove(&key);
        }
        if self.open_end.get(&key) == Some(&handle) {
            self.open_end.remove(&key);
        }
    }

    fn into_chains(self) -> Vec<Chain> {
        self.finished
            .into_iter()
            .chain(self.chains.into_iter().flatten().map(Vec::from))
            .filter(|chain| chain.len() >= 2)
            .collect()
    }
}
