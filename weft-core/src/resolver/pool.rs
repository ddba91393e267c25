// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Segmented pool of reusable stream buffers.
//!
//! Each thread is pinned to one segment, so concurrent callers rarely contend on
//! the same lock. An item taken from the pool is owned exclusively by the caller
//! until its [`Pooled`] guard is dropped.

use crate::util::Spinlock;
use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

const NUM_SEGMENTS: usize = 16;

/// Idle items kept per segment; extra returns are dropped.
const MAX_IDLE_PER_SEGMENT: usize = 8;

static NEXT_SEGMENT: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static SEGMENT_INDEX: Cell<usize> =
        Cell::new(NEXT_SEGMENT.fetch_add(1, Ordering::Relaxed) % NUM_SEGMENTS);
}

/// Items returned to a [`Pool`] are reset before they are handed out again.
pub trait Recycle {
    fn recycle(&mut self);
}

impl Recycle for Vec<u8> {
    fn recycle(&mut self) {
        self.clear();
    }
}

pub struct Pool<T: Recycle> {
    segments: [Spinlock<Vec<T>>; NUM_SEGMENTS],
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Recycle> Pool<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Pool {
            segments: std::array::from_fn(|_| Spinlock::new(Vec::new())),
            factory: Box::new(factory),
        }
    }

    #[inline(always)]
    fn segment(&self) -> &Spinlock<Vec<T>> {
        &self.segments[SEGMENT_INDEX.with(|idx| idx.get())]
    }

    /// Takes an item out of the pool, creating one when the segment is empty.
    pub fn take(&self) -> Pooled<'_, T> {
        let item = self.segment().lock().pop().unwrap_or_else(|| (self.factory)());
        Pooled {
            pool: self,
            item: Some(item),
        }
    }

    fn give_back(&self, mut item: T) {
        item.recycle();
        let mut segment = self.segment().lock();
        if segment.len() < MAX_IDLE_PER_SEGMENT {
            segment.push(item);
        }
    }

    /// Items currently idle across all segments.
    pub fn idle(&self) -> usize {
        self.segments.iter().map(|s| s.lock().len()).sum()
    }
}

/// Exclusive handle on a pooled item; returns it to the pool on drop.
pub struct Pooled<'a, T: Recycle> {
    pool: &'a Pool<T>,
    item: Option<T>,
}

impl<T: Recycle> Pooled<'_, T> {
    /// Detaches the item; it will not go back to the pool.
    pub fn into_inner(mut self) -> T {
        match self.item.take() {
            Some(item) => item,
            None => unreachable!("pooled item taken twice"),
        }
    }
}

impl<T: Recycle> Deref for Pooled<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        match &self.item {
            Some(item) => item,
            None => unreachable!("pooled item used after detach"),
        }
    }
}

impl<T: Recycle> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!("pooled item used after detach"),
        }
    }
}

impl<T: Recycle> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.give_back(item);
        }
    }
}
