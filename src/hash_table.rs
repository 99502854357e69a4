use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;

use crate::error::TryReserveError;

/// Maps a hash onto one of `bucket_count` buckets.
///
/// A table without buckets maps everything to 0.
#[inline(always)]
fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    if bucket_count == 0 {
        0
    } else {
        (hash % bucket_count as u64) as usize
    }
}

/// A stored value together with its full hash, so resizing never has to
/// rehash values.
#[derive(Clone)]
struct Slot<V> {
    hash: u64,
    value: V,
}

type Bucket<V> = Vec<Slot<V>>;

fn try_vec_with_capacity<T>(capacity: usize) -> Result<Vec<T>, TryReserveError> {
    let layout = Layout::array::<T>(capacity).map_err(|_| TryReserveError::CapacityOverflow)?;
    let mut vec = Vec::new();
    vec.try_reserve_exact(capacity)
        .map_err(|_| TryReserveError::AllocError { layout })?;
    Ok(vec)
}

fn try_alloc_buckets<V>(bucket_count: usize) -> Result<Vec<Bucket<V>>, TryReserveError> {
    let mut buckets = try_vec_with_capacity(bucket_count)?;
    buckets.resize_with(bucket_count, Vec::new);
    Ok(buckets)
}

fn try_reserve_slots<V>(bucket: &mut Bucket<V>, additional: usize) -> Result<(), TryReserveError> {
    let required = bucket
        .len()
        .checked_add(additional)
        .ok_or(TryReserveError::CapacityOverflow)?;
    let layout =
        Layout::array::<Slot<V>>(required).map_err(|_| TryReserveError::CapacityOverflow)?;
    bucket
        .try_reserve_exact(additional)
        .map_err(|_| TryReserveError::AllocError { layout })
}

/// Occupancy and memory statistics of a [`HashTable`].
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of buckets in the bucket array
    pub bucket_count: usize,
    /// Number of buckets holding no element
    pub empty_buckets: usize,
    /// Number of elements in the fullest bucket
    pub longest_bucket: usize,
    /// Load factor (populated / bucket_count)
    pub load_factor: f64,
    /// Total memory in bytes used by the table
    pub total_bytes: usize,
    /// Bytes allocated but not holding an element
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {} in {} buckets ({:.2} load factor)",
            self.populated, self.bucket_count, self.load_factor
        );
        println!(
            "Buckets: {} empty, longest holds {}",
            self.empty_buckets, self.longest_bucket
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// A separate-chaining hash table with an explicitly managed bucket array.
///
/// `HashTable<V>` stores values of type `V` in a sequence of buckets. Each
/// bucket keeps its values in insertion order. Like `hashbrown`'s raw table,
/// this type does not hash anything itself: you provide both the hash value
/// and an equality predicate for each operation.
///
/// A value with hash `h` always lives in bucket `h % bucket_count()`. When an
/// insertion finds the table holding as many values as it has buckets, the
/// bucket count doubles (or goes from 0 to 1) before the new value is placed,
/// so the load factor never exceeds 1.0 through insertion alone.
///
/// ## Performance Characteristics
///
/// - **Memory**: a `u64` hash per entry, plus the size of `V`, plus one `Vec`
///   header per bucket.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use chain_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::with_buckets(8);
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     chain_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     chain_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.bucket_size(table.bucket_index(hash)), 1);
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    buckets: Vec<Bucket<V>>,
    populated: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field(
                "bucket_sizes",
                &self.buckets.iter().map(Vec::len).collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("bucket_count", &self.buckets.len())
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table without any buckets.
    ///
    /// Nothing is allocated until the first insertion.
    pub const fn new() -> Self {
        Self {
            buckets: Vec::new(),
            populated: 0,
        }
    }

    /// Creates an empty table with `bucket_count` buckets.
    ///
    /// A request for zero buckets is treated as a request for one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_buckets(100);
    /// assert_eq!(table.bucket_count(), 100);
    ///
    /// let table: HashTable<String> = HashTable::with_buckets(0);
    /// assert_eq!(table.bucket_count(), 1);
    /// ```
    pub fn with_buckets(bucket_count: usize) -> Self {
        Self::try_with_buckets(bucket_count).unwrap_or_else(|e| e.bail())
    }

    /// Fallible version of [`with_buckets`](Self::with_buckets).
    pub fn try_with_buckets(bucket_count: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            buckets: try_alloc_buckets(bucket_count.max(1))?,
            populated: 0,
        })
    }

    /// Returns an iterator over the values in the table.
    ///
    /// Buckets are visited in index order, and the values of each bucket in
    /// insertion order. Callers should not rely on that order beyond a single
    /// bucket.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            slots: Default::default(),
            remaining: self.populated,
        }
    }

    /// Removes all values from the table and returns them as an iterator.
    ///
    /// The bucket array is kept. Values not consumed are dropped when the
    /// iterator is dropped.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            bucket: 0,
        }
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Removes every value and releases the bucket array.
    ///
    /// The bucket count goes back to 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_buckets(4);
    /// table.entry(7, |&v: &u64| v == 7).or_insert(7);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.buckets = Vec::new();
        self.populated = 0;
    }

    /// Returns the number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of values in bucket `index`, or 0 if there is no
    /// such bucket.
    pub fn bucket_size(&self, index: usize) -> usize {
        self.buckets.get(index).map_or(0, Vec::len)
    }

    /// Returns the bucket a value with `hash` maps to under the current
    /// bucket count, whether or not such a value is stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::with_buckets(10);
    /// assert_eq!(table.bucket_index(42), 2);
    ///
    /// let empty: HashTable<u64> = HashTable::new();
    /// assert_eq!(empty.bucket_index(42), 0);
    /// ```
    pub fn bucket_index(&self, hash: u64) -> usize {
        bucket_index(hash, self.buckets.len())
    }

    /// Returns `len() / bucket_count()`, or 0.0 for a table without buckets.
    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            0.0
        } else {
            self.populated as f64 / self.buckets.len() as f64
        }
    }

    /// Redistributes every value into `bucket_count` new buckets.
    ///
    /// Does nothing if `bucket_count` is smaller than [`len`](Self::len) or
    /// equal to the current bucket count. Values sharing a new bucket keep
    /// their relative order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for v in 0..4u64 {
    ///     table.entry(v, |&x: &u64| x == v).or_insert(v);
    /// }
    ///
    /// table.rehash(16);
    /// assert_eq!(table.bucket_count(), 16);
    ///
    /// // Too small for the 4 stored values.
    /// table.rehash(3);
    /// assert_eq!(table.bucket_count(), 16);
    /// ```
    pub fn rehash(&mut self, bucket_count: usize) {
        self.try_rehash(bucket_count).unwrap_or_else(|e| e.bail())
    }

    /// Fallible version of [`rehash`](Self::rehash).
    ///
    /// On error the table is left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::TryReserveError;
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_buckets(4);
    /// table.entry(1, |&v: &u64| v == 1).or_insert(1);
    ///
    /// assert_eq!(
    ///     table.try_rehash(usize::MAX),
    ///     Err(TryReserveError::CapacityOverflow)
    /// );
    /// assert_eq!(table.bucket_count(), 4);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn try_rehash(&mut self, bucket_count: usize) -> Result<(), TryReserveError> {
        if bucket_count < self.populated || bucket_count == self.buckets.len() {
            return Ok(());
        }
        self.redistribute(bucket_count, None)
    }

    /// Grows the bucket array to `bucket_count` buckets if it currently has
    /// fewer. Never shrinks.
    pub fn reserve(&mut self, bucket_count: usize) {
        self.try_reserve(bucket_count).unwrap_or_else(|e| e.bail())
    }

    /// Fallible version of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, bucket_count: usize) -> Result<(), TryReserveError> {
        if bucket_count > self.buckets.len() {
            self.try_rehash(bucket_count)?;
        }
        Ok(())
    }

    /// Moves every slot into a fresh array of `bucket_count` buckets.
    ///
    /// All allocation happens before the first slot moves, including room for
    /// one more slot with hash `pending` when given. Once the new array is
    /// swapped in, pushing can no longer fail.
    fn redistribute(
        &mut self,
        bucket_count: usize,
        pending: Option<u64>,
    ) -> Result<(), TryReserveError> {
        let mut buckets = try_alloc_buckets::<V>(bucket_count)?;

        let mut lens = try_vec_with_capacity::<usize>(bucket_count)?;
        lens.resize(bucket_count, 0);
        let hashes = self.buckets.iter().flatten().map(|slot| slot.hash);
        for hash in hashes.chain(pending) {
            lens[bucket_index(hash, bucket_count)] += 1;
        }
        for (bucket, &len) in buckets.iter_mut().zip(&lens) {
            if len > 0 {
                try_reserve_slots(bucket, len)?;
            }
        }

        let old = core::mem::replace(&mut self.buckets, buckets);
        for slot in old.into_iter().flatten() {
            let index = bucket_index(slot.hash, bucket_count);
            self.buckets[index].push(slot);
        }

        Ok(())
    }

    /// Makes room for one more value with `hash`, growing the bucket array
    /// first if the table is full.
    fn reserve_for_insert(&mut self, hash: u64) -> Result<(), TryReserveError> {
        if self.populated >= self.buckets.len() {
            return self.grow(hash);
        }

        let index = bucket_index(hash, self.buckets.len());
        let bucket = &mut self.buckets[index];
        if bucket.len() == bucket.capacity() {
            let layout = Layout::array::<Slot<V>>(bucket.len() + 1)
                .map_err(|_| TryReserveError::CapacityOverflow)?;
            bucket
                .try_reserve(1)
                .map_err(|_| TryReserveError::AllocError { layout })?;
        }
        Ok(())
    }

    #[inline]
    #[cold]
    fn grow(&mut self, pending: u64) -> Result<(), TryReserveError> {
        let bucket_count = if self.buckets.is_empty() {
            1
        } else {
            self.buckets
                .len()
                .checked_mul(2)
                .ok_or(TryReserveError::CapacityOverflow)?
        };
        self.redistribute(bucket_count, Some(pending))
    }

    fn find_position(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<(usize, usize)> {
        if self.buckets.is_empty() {
            return None;
        }

        let index = self.bucket_index(hash);
        self.buckets[index]
            .iter()
            .position(|slot| slot.hash == hash && eq(&slot.value))
            .map(|slot| (index, slot))
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(10, |&v: &u64| v == 10).or_insert(10);
    ///
    /// assert_eq!(table.find(10, |&v| v == 10), Some(&10));
    /// assert_eq!(table.find(11, |&v| v == 11), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let (bucket, slot) = self.find_position(hash, eq)?;
        Some(&self.buckets[bucket][slot].value)
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    ///
    /// The value must not be changed in a way that changes its hash.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let (bucket, slot) = self.find_position(hash, eq)?;
        Some(&mut self.buckets[bucket][slot].value)
    }

    /// Removes and returns a value by hash and equality predicate.
    ///
    /// The remaining values of the bucket keep their order. The bucket array
    /// never shrinks.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let (bucket, slot) = self.find_position(hash, eq)?;
        self.populated -= 1;
        Some(self.buckets[bucket].remove(slot).value)
    }

    /// Gets the entry for a value with `hash` matching `eq`, for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::Entry;
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<(u64, &str)> = HashTable::new();
    ///
    /// match table.entry(5, |&(k, _)| k == 5) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert((5, "five"));
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// assert!(matches!(table.entry(5, |&(k, _)| k == 5), Entry::Occupied(_)));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.find_position(hash, eq) {
            Some((bucket, slot)) => Entry::Occupied(OccupiedEntry {
                table: self,
                bucket,
                slot,
            }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    ///
    /// Surviving values keep their order within each bucket. The bucket array
    /// is not resized.
    pub fn retain(&mut self, mut f: impl FnMut(&V) -> bool) {
        for bucket in &mut self.buckets {
            let before = bucket.len();
            bucket.retain(|slot| f(&slot.value));
            self.populated -= before - bucket.len();
        }
    }

    /// Computes a histogram of bucket lengths.
    ///
    /// Entry `n` of the returned vector is the number of buckets holding
    /// exactly `n` values. The vector has one entry past the longest bucket,
    /// and is empty for a table without buckets.
    #[cfg(any(test, feature = "stats"))]
    pub fn bucket_histogram(&self) -> Vec<usize> {
        let longest = self.buckets.iter().map(Vec::len).max();
        let mut hist = alloc::vec![0usize; longest.map_or(0, |l| l + 1)];
        for bucket in &self.buckets {
            hist[bucket.len()] += 1;
        }
        hist
    }

    /// Gathers occupancy and memory statistics for the table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let bucket_header = core::mem::size_of::<Bucket<V>>();
        let slot_size = core::mem::size_of::<Slot<V>>();

        let slot_capacity: usize = self.buckets.iter().map(Vec::capacity).sum();
        let total_bytes = self.buckets.capacity() * bucket_header + slot_capacity * slot_size;
        let wasted_bytes = (self.buckets.capacity() - self.buckets.len()) * bucket_header
            + (slot_capacity - self.populated) * slot_size;

        DebugStats {
            populated: self.populated,
            bucket_count: self.buckets.len(),
            empty_buckets: self.buckets.iter().filter(|b| b.is_empty()).count(),
            longest_bucket: self.buckets.iter().map(Vec::len).max().unwrap_or(0),
            load_factor: self.load_factor(),
            total_bytes,
            wasted_bytes,
        }
    }
}

/// A view into a single slot of a [`HashTable`], which may be vacant or
/// occupied.
pub enum Entry<'a, V> {
    /// A stored value matched.
    Occupied(OccupiedEntry<'a, V>),
    /// No stored value matched.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant, and returns a mutable
    /// reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Like [`or_insert`](Self::or_insert), computing the value only if the
    /// entry is vacant.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }
}

/// An occupied entry of a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    bucket: usize,
    slot: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns a reference to the stored value.
    pub fn get(&self) -> &V {
        &self.table.buckets[self.bucket][self.slot].value
    }

    /// Returns a mutable reference to the stored value.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.buckets[self.bucket][self.slot].value
    }

    /// Converts the entry into a mutable reference bound to the table.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.table.buckets[self.bucket][self.slot].value
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        self.table.populated -= 1;
        self.table.buckets[self.bucket].remove(self.slot).value
    }
}

/// A vacant entry of a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts a value into the table, growing the bucket array first if the
    /// table is full.
    pub fn insert(self, value: V) -> &'a mut V {
        self.try_insert(value).unwrap_or_else(|e| e.bail())
    }

    /// Fallible version of [`insert`](Self::insert).
    ///
    /// On error the value is dropped and the table is left exactly as it
    /// was.
    pub fn try_insert(self, value: V) -> Result<&'a mut V, TryReserveError> {
        let table = self.table;
        let hash = self.hash;
        table.reserve_for_insert(hash)?;

        table.populated += 1;
        let index = bucket_index(hash, table.buckets.len());
        let bucket = &mut table.buckets[index];
        let slot = bucket.len();
        bucket.push(Slot { hash, value });

        Ok(&mut bucket[slot].value)
    }
}

/// An iterator over the values of a [`HashTable`].
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Bucket<V>>,
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.slots.next() {
                self.remaining -= 1;
                return Some(&slot.value);
            }
            self.slots = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A draining iterator over the values of a [`HashTable`].
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    bucket: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.table.buckets.get_mut(self.bucket) {
            if let Some(slot) = bucket.pop() {
                self.table.populated -= 1;
                return Some(slot.value);
            }
            self.bucket += 1;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in self {}
    }
}

/// A consuming iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    buckets: alloc::vec::IntoIter<Bucket<V>>,
    slots: alloc::vec::IntoIter<Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.slots.next() {
                self.remaining -= 1;
                return Some(slot.value);
            }
            self.slots = self.buckets.next()?.into_iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            buckets: self.buckets.into_iter(),
            slots: Vec::new().into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
