use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::TryReserveError;
use crate::hash_table::Entry;
use crate::hash_table::HashTable;

/// A hash set implemented using the separate-chaining `HashTable` as the
/// underlying storage.
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash values. Besides the
/// usual set operations it gives direct control over the bucket array: its
/// size can be chosen up front, changed with [`rehash`](Self::rehash) and
/// [`reserve`](Self::reserve), and inspected bucket by bucket.
///
/// A value lives in bucket `hasher().hash_one(value) % bucket_count()`. The
/// bucket count doubles whenever an insertion finds the set holding as many
/// values as it has buckets, and never shrinks on its own.
///
/// Moving the contents out of a set while keeping it usable is spelled
/// `core::mem::take(&mut set)`: the source is left empty with no buckets.
///
/// # Performance Characteristics
///
/// - **Memory**: a `u64` hash per value plus the size of `T`, and one `Vec`
///   header per bucket.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: HashTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash set with the given hasher builder.
    ///
    /// The set starts without any buckets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use chain_hash::hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// assert_eq!(set.bucket_count(), 0);
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new hash set with `bucket_count` buckets and the given hasher
    /// builder.
    ///
    /// A request for zero buckets is treated as a request for one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use chain_hash::hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_buckets_and_hasher(100, RandomState::new());
    /// assert_eq!(set.bucket_count(), 100);
    /// # }
    /// ```
    pub fn with_buckets_and_hasher(bucket_count: usize, hash_builder: S) -> Self {
        Self::try_with_buckets_and_hasher(bucket_count, hash_builder).unwrap_or_else(|e| e.bail())
    }

    /// Fallible version of
    /// [`with_buckets_and_hasher`](Self::with_buckets_and_hasher).
    pub fn try_with_buckets_and_hasher(
        bucket_count: usize,
        hash_builder: S,
    ) -> Result<Self, TryReserveError> {
        Ok(Self {
            table: HashTable::try_with_buckets(bucket_count)?,
            hash_builder,
        })
    }

    /// Creates a set from a sequence of known length, using the given hasher
    /// builder.
    ///
    /// The bucket array is sized to the length of the sequence (at least one
    /// bucket), duplicates included, and the values are then inserted in
    /// order. Duplicates collapse into one value.
    pub fn from_keys_with_hasher<I>(keys: I, hash_builder: S) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let keys = keys.into_iter();
        let mut set = Self::with_buckets_and_hasher(keys.len(), hash_builder);
        set.extend(keys);
        set
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Removes all elements from the set and releases its buckets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.bucket_count(), 0);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns the number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Returns the number of elements in bucket `index`, or 0 if `index` is
    /// out of range.
    pub fn bucket_size(&self, index: usize) -> usize {
        self.table.bucket_size(index)
    }

    /// Returns the bucket `value` maps to under the current bucket count,
    /// whether or not it is in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use core::hash::BuildHasher;
    ///
    /// use chain_hash::HashSet;
    ///
    /// let set: HashSet<&str> = HashSet::with_buckets(7);
    /// let expected = set.hasher().hash_one("absent") % 7;
    /// assert_eq!(set.bucket(&"absent") as u64, expected);
    /// # }
    /// ```
    pub fn bucket(&self, value: &T) -> usize {
        self.table.bucket_index(self.hash_builder.hash_one(value))
    }

    /// Returns `len() / bucket_count()`, or 0.0 for a set without buckets.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Redistributes every element into `bucket_count` new buckets.
    ///
    /// Does nothing if `bucket_count` is smaller than [`len`](Self::len) or
    /// equal to the current bucket count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = (0..10).collect();
    /// set.rehash(64);
    /// assert_eq!(set.bucket_count(), 64);
    ///
    /// set.rehash(5);
    /// assert_eq!(set.bucket_count(), 64);
    /// assert!((0..10).all(|v| set.contains(&v)));
    /// # }
    /// ```
    pub fn rehash(&mut self, bucket_count: usize) {
        self.table.rehash(bucket_count);
    }

    /// Fallible version of [`rehash`](Self::rehash).
    ///
    /// On error the set is left exactly as it was.
    pub fn try_rehash(&mut self, bucket_count: usize) -> Result<(), TryReserveError> {
        self.table.try_rehash(bucket_count)
    }

    /// Grows the bucket array to `bucket_count` buckets if it currently has
    /// fewer. Never shrinks.
    ///
    /// Note that the argument is a bucket count, not a number of additional
    /// elements.
    pub fn reserve(&mut self, bucket_count: usize) {
        self.table.reserve(bucket_count);
    }

    /// Fallible version of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, bucket_count: usize) -> Result<(), TryReserveError> {
        self.table.try_reserve(bucket_count)
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain this value, `true` is returned.
    /// - If the set already contained this value, `false` is returned and the
    ///   set is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.insert(37), true);
    /// assert_eq!(set.insert(37), false);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.try_insert(value).unwrap_or_else(|e| e.bail())
    }

    /// Fallible version of [`insert`](Self::insert).
    ///
    /// If growing the bucket array fails, the value is dropped and the set is
    /// left exactly as it was.
    pub fn try_insert(&mut self, value: T) -> Result<bool, TryReserveError> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.try_insert(value)?;
                Ok(true)
            }
        }
    }

    /// Returns `true` if the set contains a value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&2));
    /// # }
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Removes a value from the set. Returns whether the value was present.
    ///
    /// The bucket array is never shrunk.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Adds a value to the set, replacing the existing equal value, if any.
    /// Returns the replaced value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<Vec<i32>> = HashSet::new();
    /// set.insert(Vec::new());
    ///
    /// assert_eq!(set.get(&Vec::new()).unwrap().capacity(), 0);
    /// set.replace(Vec::with_capacity(10));
    /// assert!(set.get(&Vec::new()).unwrap().capacity() >= 10);
    /// # }
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            Entry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Removes and returns the value in the set, if any, that is equal to the
    /// given one.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Returns a reference to the value in the set, if any, that is equal to
    /// the given value.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// An iterator visiting all elements in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let set: HashSet<i32> = [1, 2, 3].into();
    /// let mut values: Vec<_> = set.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [1, 2, 3]);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Clears the set, returning all elements as an iterator. Keeps the
    /// bucket array.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// The bucket array is never shrunk.
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.table.retain(f);
    }

    /// Computes a histogram of bucket lengths: entry `n` is the number of
    /// buckets holding exactly `n` elements.
    #[cfg(any(test, feature = "stats"))]
    pub fn bucket_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.bucket_histogram()
    }

    /// Gathers occupancy and memory statistics for the set.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash set using the default hasher builder.
    ///
    /// The set starts without any buckets and allocates on first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// assert_eq!(set.bucket_count(), 0);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new hash set with `bucket_count` buckets using the default
    /// hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::with_buckets(0);
    /// assert_eq!(set.bucket_count(), 1);
    /// # }
    /// ```
    pub fn with_buckets(bucket_count: usize) -> Self {
        Self::with_buckets_and_hasher(bucket_count, S::default())
    }

    /// Fallible version of [`with_buckets`](Self::with_buckets).
    pub fn try_with_buckets(bucket_count: usize) -> Result<Self, TryReserveError> {
        Self::try_with_buckets_and_hasher(bucket_count, S::default())
    }

    /// Creates a set from a sequence of known length using the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let set: HashSet<&str> = HashSet::from_keys(["a", "b", "a", "c"]);
    /// assert_eq!(set.bucket_count(), 4);
    /// assert_eq!(set.len(), 3);
    /// # }
    /// ```
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        Self::from_keys_with_hasher(keys, S::default())
    }
}

impl<T, S> Default for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S, const N: usize> From<[T; N]> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from(values: [T; N]) -> Self {
        Self::from_keys(values)
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T> {
    inner: crate::hash_table::Drain<'a, T>,
}

/// A consuming iterator over the values of a `HashSet`.
pub struct IntoIter<T> {
    inner: crate::hash_table::IntoIter<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, S> IntoIterator for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = HashSet::with_buckets(iter.size_hint().0);
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S> Extend<&'a T> for HashSet<T, S>
where
    T: 'a + Hash + Eq + Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Hashes a `u64` to itself, so bucket placement is predictable.
    #[derive(Default)]
    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }

        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
    }

    #[derive(Clone, Default)]
    struct IdentityBuilder;

    impl BuildHasher for IdentityBuilder {
        type Hasher = IdentityHasher;

        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher::default()
        }
    }

    #[test]
    fn test_new_and_with_hasher() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.bucket_count(), 0);
        assert_eq!(set.load_factor(), 0.0);

        let set = HashSet::<i32, _>::with_hasher(SipHashBuilder::default());
        assert!(set.is_empty());
        assert_eq!(set.bucket(&5), 0);
    }

    #[test]
    fn test_with_buckets() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::with_buckets(100);
        assert_eq!(set.bucket_count(), 100);
        assert!(set.is_empty());

        let set: HashSet<i32, SipHashBuilder> = HashSet::with_buckets(0);
        assert_eq!(set.bucket_count(), 1);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert!(set.insert(2));
        assert!(set.insert(3));
        assert!(!set.insert(1));

        assert_eq!(set.len(), 3);
        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(set.contains(&3));
        assert!(!set.contains(&4));
    }

    #[test]
    fn test_duplicate_insert_keeps_position() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            set.insert(i);
        }
        let buckets = set.bucket_count();
        let bucket = set.bucket(&4);
        let bucket_size = set.bucket_size(bucket);

        assert!(!set.insert(4));
        assert_eq!(set.len(), 10);
        assert_eq!(set.bucket_count(), buckets);
        assert_eq!(set.bucket(&4), bucket);
        assert_eq!(set.bucket_size(bucket), bucket_size);
    }

    #[test]
    fn test_int_scenario() {
        let mut set: HashSet<i32, SipHashBuilder> = HashSet::new();
        assert_eq!(set.bucket_count(), 0);

        set.insert(1);
        assert_eq!(set.bucket_count(), 1);
        assert_eq!(set.len(), 1);

        set.insert(2);
        assert_eq!(set.bucket_count(), 2);
        assert_eq!(set.len(), 2);

        assert!(set.remove(&1));
        assert_eq!(set.len(), 1);
        assert_eq!(set.bucket_count(), 2);
        assert!(!set.contains(&1));
        assert!(set.contains(&2));

        set.clear();
        assert_eq!(set.bucket_count(), 0);
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_string_range_scenario() {
        let keys = ["a", "b", "a", "c"].map(String::from);
        let set: HashSet<String, SipHashBuilder> = HashSet::from_keys(keys);
        assert_eq!(set.bucket_count(), 4);
        assert_eq!(set.len(), 3);
        for key in ["a", "b", "c"] {
            assert!(set.contains(&key.to_string()));
        }
    }

    #[test]
    fn test_empty_range_gets_one_bucket() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::from_keys(Vec::new());
        assert_eq!(set.bucket_count(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_array_and_collect() {
        let set: HashSet<i32, SipHashBuilder> = [5, 6, 5].into();
        assert_eq!(set.bucket_count(), 3);
        assert_eq!(set.len(), 2);

        let set: HashSet<i32, SipHashBuilder> = vec![1, 2, 3, 4, 5].into_iter().collect();
        assert_eq!(set.bucket_count(), 5);
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_remove() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);

        assert!(set.remove(&1));
        assert!(!set.remove(&1));
        assert!(!set.contains(&1));
        assert!(set.contains(&2));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_from_bucketless_set() {
        let mut set: HashSet<i32, SipHashBuilder> = HashSet::new();
        assert!(!set.remove(&1));
        assert!(!set.contains(&1));
        assert_eq!(set.bucket_count(), 0);
    }

    #[test]
    fn test_take_get_replace() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert("x".to_string());

        assert_eq!(set.get(&"x".to_string()), Some(&"x".to_string()));
        assert_eq!(set.replace("x".to_string()), Some("x".to_string()));
        assert_eq!(set.replace("y".to_string()), None);
        assert_eq!(set.len(), 2);

        assert_eq!(set.take(&"x".to_string()), Some("x".to_string()));
        assert_eq!(set.take(&"x".to_string()), None);
        assert_eq!(set.get(&"x".to_string()), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_growth_sequence() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        let mut expected = 1;
        for i in 0..1000 {
            set.insert(i);
            assert!(set.len() <= set.bucket_count());
            assert!(set.bucket_count().is_power_of_two());
            if set.bucket_count() != expected {
                expected *= 2;
                assert_eq!(set.bucket_count(), expected);
            }
        }
        assert_eq!(set.bucket_count(), 1024);
    }

    #[test]
    fn test_rehash_relocates_every_key() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..50u32 {
            set.insert(i);
        }

        for n in [50usize, 97, 128, 333] {
            set.rehash(n);
            assert_eq!(set.bucket_count(), n);
            for i in 0..50u32 {
                assert!(set.contains(&i));
                let expected = set.hasher().hash_one(i) % n as u64;
                assert_eq!(set.bucket(&i) as u64, expected);
                assert!(set.bucket_size(set.bucket(&i)) >= 1);
            }
            let total: usize = (0..n).map(|b| set.bucket_size(b)).sum();
            assert_eq!(total, set.len());
        }
    }

    #[test]
    fn test_rehash_smaller_than_len_is_noop() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            set.insert(i);
        }
        let buckets = set.bucket_count();
        let sizes: Vec<usize> = (0..buckets).map(|b| set.bucket_size(b)).collect();

        set.rehash(9);
        assert_eq!(set.bucket_count(), buckets);
        let after: Vec<usize> = (0..buckets).map(|b| set.bucket_size(b)).collect();
        assert_eq!(sizes, after);
    }

    #[test]
    fn test_reserve() {
        let mut set: HashSet<i32, SipHashBuilder> = HashSet::new();
        set.reserve(100);
        assert_eq!(set.bucket_count(), 100);

        set.reserve(10);
        assert_eq!(set.bucket_count(), 100);

        for i in 0..100 {
            set.insert(i);
        }
        assert_eq!(set.bucket_count(), 100);
        set.insert(100);
        assert_eq!(set.bucket_count(), 200);
    }

    #[test]
    fn test_try_variants_report_overflow() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);

        assert_eq!(
            set.try_rehash(usize::MAX),
            Err(TryReserveError::CapacityOverflow)
        );
        assert_eq!(
            set.try_reserve(usize::MAX),
            Err(TryReserveError::CapacityOverflow)
        );
        assert_eq!(set.bucket_count(), 2);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(set.contains(&2));

        assert!(HashSet::<i32, SipHashBuilder>::try_with_buckets(usize::MAX).is_err());
        assert_eq!(set.try_insert(3), Ok(true));
        assert_eq!(set.try_insert(3), Ok(false));
    }

    #[test]
    fn test_identity_placement() {
        let mut set: HashSet<u64, IdentityBuilder> = HashSet::with_buckets(10);
        for key in [3u64, 13, 23, 4] {
            set.insert(key);
        }
        assert_eq!(set.bucket_size(3), 3);
        assert_eq!(set.bucket_size(4), 1);
        assert_eq!(set.bucket(&33), 3);
        assert_eq!(set.bucket_size(10), 0);
        assert_eq!(set.load_factor(), 0.4);
        assert_eq!(set.bucket_histogram(), vec![8, 1, 0, 1]);
    }

    #[test]
    fn test_load_factor() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..5 {
            set.insert(i);
        }
        assert_eq!(set.bucket_count(), 8);
        assert_eq!(set.load_factor(), 5.0 / 8.0);
        assert_eq!(set.debug_stats().load_factor, set.load_factor());
    }

    #[test]
    fn test_clear() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.bucket_count(), 0);
        assert!(!set.contains(&1));

        assert!(set.insert(3));
        assert_eq!(set.bucket_count(), 1);
    }

    #[test]
    fn test_take_leaves_source_usable() {
        let mut source = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..6 {
            source.insert(i);
        }

        let moved = core::mem::take(&mut source);
        assert_eq!(moved.len(), 6);
        assert_eq!(moved.bucket_count(), 8);
        assert_eq!(source.len(), 0);
        assert_eq!(source.bucket_count(), 0);

        assert!(source.insert(42));
        assert!(source.contains(&42));
        assert_eq!(source.len(), 1);
        assert!(!moved.contains(&42));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..20 {
            original.insert(i);
        }

        let mut copy = original.clone();
        assert_eq!(copy, original);
        assert_eq!(copy.bucket_count(), original.bucket_count());
        for b in 0..original.bucket_count() {
            assert_eq!(copy.bucket_size(b), original.bucket_size(b));
        }

        copy.remove(&0);
        copy.insert(100);
        assert!(original.contains(&0));
        assert!(!original.contains(&100));
        assert_eq!(original.len(), 20);

        let mut target = HashSet::with_hasher(SipHashBuilder::default());
        target.insert(-1);
        target.clone_from(&original);
        assert_eq!(target, original);
        assert!(!target.contains(&-1));
    }

    #[test]
    fn test_iter() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        let iter = set.iter();
        assert_eq!(iter.len(), 3);
        let mut values: Vec<_> = iter.copied().collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3]);

        let mut via_ref: Vec<_> = (&set).into_iter().copied().collect();
        via_ref.sort();
        assert_eq!(via_ref, vec![1, 2, 3]);
    }

    #[test]
    fn test_into_iterator() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);

        let mut values: Vec<_> = set.into_iter().collect();
        values.sort();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_drain() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..5 {
            set.insert(i);
        }
        let buckets = set.bucket_count();

        let mut drained: Vec<_> = set.drain().collect();
        drained.sort();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(set.is_empty());
        assert_eq!(set.bucket_count(), buckets);
    }

    #[test]
    fn test_retain() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            set.insert(i);
        }
        let buckets = set.bucket_count();

        set.retain(|&v| v % 3 == 0);
        assert_eq!(set.len(), 4);
        assert_eq!(set.bucket_count(), buckets);
        for i in 0..10 {
            assert_eq!(set.contains(&i), i % 3 == 0);
        }
    }

    #[test]
    fn test_extend() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.extend([1, 2, 3]);
        set.extend(&[3, 4]);
        assert_eq!(set.len(), 4);
        assert!((1..=4).all(|v| set.contains(&v)));
    }

    #[test]
    fn test_insert_remove_cycle() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for round in 0..5 {
            for i in 0..100 {
                assert!(set.insert(i + round * 1000));
            }
            for i in (0..100).step_by(2) {
                assert!(set.remove(&(i + round * 1000)));
            }
        }
        assert_eq!(set.len(), 250);
        for round in 0..5 {
            for i in 0..100 {
                assert_eq!(set.contains(&(i + round * 1000)), i % 2 == 1);
            }
        }
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_matches_reference_set() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        let mut reference = std::collections::HashSet::new();
        let mut state = OsRng.try_next_u64().unwrap_or(1) | 1;

        for _ in 0..2000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let key = state % 64;
            if state & (1 << 40) == 0 {
                assert_eq!(set.insert(key), reference.insert(key));
            } else {
                assert_eq!(set.remove(&key), reference.remove(&key));
            }
            assert_eq!(set.len(), reference.len());
            assert!(set.len() <= set.bucket_count());
        }
        for key in 0..64 {
            assert_eq!(set.contains(&key), reference.contains(&key));
        }
    }

    #[test]
    fn test_complex_values() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        let vec1 = vec![1, 2, 3];
        let vec2 = vec![4, 5, 6];
        let vec3 = vec![1, 2, 3];

        assert!(set.insert(vec1.clone()));
        assert!(set.insert(vec2.clone()));
        assert!(!set.insert(vec3));

        assert_eq!(set.len(), 2);
        assert!(set.contains(&vec1));
        assert!(set.contains(&vec2));
    }

    #[test]
    fn test_eq_ignores_layout() {
        let a: HashSet<i32, SipHashBuilder> = HashSet::from_keys([1, 2, 3]);
        let mut b: HashSet<i32, SipHashBuilder> = HashSet::with_buckets(64);
        b.extend([3, 2, 1]);
        assert_ne!(a.bucket_count(), b.bucket_count());
        assert_eq!(a, b);

        b.insert(4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_format() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(7);
        assert_eq!(format!("{set:?}"), "{7}");
    }
}
