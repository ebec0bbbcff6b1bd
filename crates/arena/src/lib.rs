//! Generational arena.
//!
//! Backing store for the document tree and the layout tree. Slots are reused
//! after removal; each reuse bumps the slot generation so stale ids stop
//! resolving instead of aliasing a new value.

#![forbid(unsafe_code)]

use core::fmt;
use core::ops::{Index, IndexMut};

/// Stable handle into an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenIndex {
    pub index: u32,
    pub generation: u32,
}

impl fmt::Debug for GenIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

impl<T> Entry<T> {
    fn generation(&self) -> u32 {
        match self {
            Entry::Occupied { generation, .. } | Entry::Vacant { generation, .. } => *generation,
        }
    }
}

pub struct Arena<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), free_head: None, len: 0 }
    }

    /// Store `value`, reusing the most recently freed slot when one exists.
    pub fn allocate(&mut self, value: T) -> GenIndex {
        self.len += 1;
        match self.free_head {
            Some(index) => {
                let slot = &mut self.entries[index as usize];
                let (generation, next_free) = match slot {
                    Entry::Vacant { generation, next_free } => (*generation, *next_free),
                    Entry::Occupied { .. } => unreachable!("free list points at occupied slot"),
                };
                self.free_head = next_free;
                *slot = Entry::Occupied { generation, value };
                GenIndex { index, generation }
            }
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(Entry::Occupied { generation: 0, value });
                GenIndex { index, generation: 0 }
            }
        }
    }

    pub fn get(&self, id: GenIndex) -> Option<&T> {
        match self.entries.get(id.index as usize)? {
            Entry::Occupied { generation, value } if *generation == id.generation => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: GenIndex) -> Option<&mut T> {
        match self.entries.get_mut(id.index as usize)? {
            Entry::Occupied { generation, value } if *generation == id.generation => Some(value),
            _ => None,
        }
    }

    /// Remove the value behind `id`. Returns `None` for stale or unknown ids.
    pub fn deallocate(&mut self, id: GenIndex) -> Option<T> {
        let slot = self.entries.get_mut(id.index as usize)?;
        if !matches!(slot, Entry::Occupied { generation, .. } if *generation == id.generation) {
            return None;
        }
        let vacant = Entry::Vacant {
            generation: id.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let old = core::mem::replace(slot, vacant);
        self.free_head = Some(id.index);
        self.len -= 1;
        match old {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    pub fn contains(&self, id: GenIndex) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every value. Outstanding ids become stale.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        for (i, slot) in self.entries.iter_mut().enumerate() {
            let bump = matches!(slot, Entry::Occupied { .. }) as u32;
            let generation = slot.generation().wrapping_add(bump);
            let next_free = if i + 1 < count { Some(i as u32 + 1) } else { None };
            *slot = Entry::Vacant { generation, next_free };
        }
        self.free_head = if count > 0 { Some(0) } else { None };
        self.len = 0;
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (GenIndex, &T)> {
        self.entries.iter().enumerate().filter_map(|(i, e)| match e {
            Entry::Occupied { generation, value } => {
                Some((GenIndex { index: i as u32, generation: *generation }, value))
            }
            Entry::Vacant { .. } => None,
        })
    }
}

impl<T> Index<GenIndex> for Arena<T> {
    type Output = T;

    fn index(&self, id: GenIndex) -> &T {
        match self.get(id) {
            Some(v) => v,
            None => panic!("stale arena index {id:?}"),
        }
    }
}

impl<T> IndexMut<GenIndex> for Arena<T> {
    fn index_mut(&mut self, id: GenIndex) -> &mut T {
        match self.get_mut(id) {
            Some(v) => v,
            None => panic!("stale arena index {id:?}"),
        }
    }
}
