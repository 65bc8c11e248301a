//! Comparator driven sorting, searching and grouping.
//!
//! Every comparator follows the three-way contract of [`Ordering`]: `Less` if
//! the first argument sorts before the second, `Greater` if after and `Equal`
//! if both are interchangeable. All sorts are stable, also when `reverse` is
//! set: equal elements keep their input order in either direction.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;


#[inline(always)]
fn directed<T, F: Fn(&T, &T) -> Ordering>(compare: &F, reverse: bool, a: &T, b: &T) -> Ordering {
	let ord = compare(a, b);
	if reverse {
		ord.reverse()
	} else {
		ord
	}
}

pub fn bubble_sort<T, F: Fn(&T, &T) -> Ordering>(items: &mut [T], compare: F, reverse: bool) {
	let n = items.len();
	for pass in 0..n {
		let mut swapped = false;
		for j in 0..(n - pass).saturating_sub(1) {
			if directed(&compare, reverse, &items[j], &items[j+1]) == Ordering::Greater {
				items.swap(j, j+1);
				swapped = true;
			}
		}
		if !swapped {
			break
		}
	}
}

pub fn selection_sort<T, F: Fn(&T, &T) -> Ordering>(items: &mut [T], compare: F, reverse: bool) {
	let n = items.len();
	for i in 0..n {
		let mut min = i;
		for j in (i+1)..n {
			// strict comparison keeps the first of several minimal elements
			if directed(&compare, reverse, &items[j], &items[min]) == Ordering::Less {
				min = j;
			}
		}
		// rotating instead of swapping keeps the skipped elements in order
		items[i..=min].rotate_right(1);
	}
}

pub fn insertion_sort<T, F: Fn(&T, &T) -> Ordering>(items: &mut [T], compare: F, reverse: bool) {
	for i in 1..items.len() {
		let mut j = i;
		while j > 0 && directed(&compare, reverse, &items[j-1], &items[j]) == Ordering::Greater {
			items.swap(j-1, j);
			j -= 1;
		}
	}
}

/// Merges two slices which are already sorted under `compare` (and the same
/// `reverse` flag) into a new sorted vector. On ties, elements of `left` come
/// first.
pub fn merge<T: Clone, F: Fn(&T, &T) -> Ordering>(left: &[T], right: &[T], compare: F, reverse: bool) -> Vec<T> {
	merge_by(left, right, &compare, reverse)
}

fn merge_by<T: Clone, F: Fn(&T, &T) -> Ordering>(left: &[T], right: &[T], compare: &F, reverse: bool) -> Vec<T> {
	let mut result = Vec::with_capacity(left.len() + right.len());
	let mut i = 0;
	let mut j = 0;
	while i < left.len() && j < right.len() {
		if directed(compare, reverse, &left[i], &right[j]) == Ordering::Greater {
			result.push(right[j].clone());
			j += 1;
		} else {
			result.push(left[i].clone());
			i += 1;
		}
	}
	result.extend_from_slice(&left[i..]);
	result.extend_from_slice(&right[j..]);
	result
}

/// Returns a sorted copy of `items`; the input is left untouched.
pub fn merge_sort<T: Clone, F: Fn(&T, &T) -> Ordering>(items: &[T], compare: F, reverse: bool) -> Vec<T> {
	merge_sort_by(items, &compare, reverse)
}

fn merge_sort_by<T: Clone, F: Fn(&T, &T) -> Ordering>(items: &[T], compare: &F, reverse: bool) -> Vec<T> {
	if items.len() <= 1 {
		return items.to_vec()
	}
	let mid = items.len() / 2;
	let left = merge_sort_by(&items[..mid], compare, reverse);
	let right = merge_sort_by(&items[mid..], compare, reverse);
	merge_by(&left, &right, compare, reverse)
}

/// The sort used throughout the crate.
pub fn sort<T: Clone, F: Fn(&T, &T) -> Ordering>(items: &[T], compare: F, reverse: bool) -> Vec<T> {
	merge_sort(items, compare, reverse)
}

/// Classic binary search over an ascending slice. Returns the index of *a*
/// matching element, or `None`.
pub fn binary_search<T: Ord>(sorted: &[T], target: &T) -> Option<usize> {
	let mut lo = 0;
	let mut hi = sorted.len();
	while lo < hi {
		let mid = lo + (hi - lo) / 2;
		match sorted[mid].cmp(target) {
			Ordering::Equal => return Some(mid),
			Ordering::Less => lo = mid + 1,
			Ordering::Greater => hi = mid,
		}
	}
	None
}

/// Returns all indices holding `target`, or `None` if there are none.
pub fn linear_search<T: PartialEq>(items: &[T], target: &T) -> Option<Vec<usize>> {
	let found: Vec<usize> = items.iter()
		.enumerate()
		.filter(|(_, v)| *v == target)
		.map(|(i, _)| i)
		.collect();
	if found.is_empty() {
		None
	} else {
		Some(found)
	}
}

/// First index whose key is not less than `target`, i.e. the insertion
/// point. `sorted` must be ascending by `key`.
pub fn lower_bound<T, K: Ord, F: Fn(&T) -> K>(sorted: &[T], key: F, target: &K) -> usize {
	let mut lo = 0;
	let mut hi = sorted.len();
	while lo < hi {
		let mid = lo + (hi - lo) / 2;
		if key(&sorted[mid]) < *target {
			lo = mid + 1;
		} else {
			hi = mid;
		}
	}
	lo
}

pub fn filter<T: Clone, P: Fn(&T) -> bool>(items: &[T], predicate: P) -> Vec<T> {
	items.iter().filter(|v| predicate(v)).cloned().collect()
}


/// Key to list mapping which remembers the order in which keys were first
/// seen.
#[derive(Debug, Clone)]
pub struct Groups<K: Hash + Eq, V> {
	keys: HashMap<K, usize>,
	groups: Vec<(K, Vec<V>)>,
}

impl<K: Hash + Eq, V> Default for Groups<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K: Hash + Eq, V> Groups<K, V> {
	pub fn new() -> Self {
		Self{
			keys: HashMap::new(),
			groups: Vec::new(),
		}
	}

	pub fn get_index(&self, k: &K) -> Option<usize> {
		Some(*self.keys.get(k)?)
	}

	pub fn get(&self, k: &K) -> Option<&[V]> {
		let index = self.get_index(k)?;
		Some(&self.groups[index].1[..])
	}

	pub fn keys(&self) -> impl Iterator<Item = &K> {
		self.groups.iter().map(|(k, _)| k)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
		self.groups.iter().map(|(k, v)| (k, &v[..]))
	}

	pub fn len(&self) -> usize {
		self.groups.len()
	}

	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}

	pub fn clear(&mut self) {
		self.keys.clear();
		self.groups.clear();
	}
}

impl<K: Hash + Eq + Clone, V> Groups<K, V> {
	pub fn get_or_create(&mut self, k: K) -> &mut Vec<V> {
		let index = match self.keys.get(&k) {
			Some(v) => *v,
			None => {
				let v = self.groups.len();
				self.groups.push((k.clone(), Vec::new()));
				self.keys.insert(k, v);
				v
			},
		};
		&mut self.groups[index].1
	}

	pub fn push(&mut self, k: K, v: V) {
		self.get_or_create(k).push(v);
	}

	/// Replaces the list of `k`, keeping the key's position if it exists.
	pub fn insert(&mut self, k: K, values: Vec<V>) -> Option<Vec<V>> {
		match self.keys.get(&k) {
			Some(index) => Some(std::mem::replace(&mut self.groups[*index].1, values)),
			None => {
				self.keys.insert(k.clone(), self.groups.len());
				self.groups.push((k, values));
				None
			},
		}
	}
}

impl<K: Hash + Eq, V> IntoIterator for Groups<K, V> {
	type Item = (K, Vec<V>);
	type IntoIter = std::vec::IntoIter<(K, Vec<V>)>;

	fn into_iter(self) -> Self::IntoIter {
		self.groups.into_iter()
	}
}

/// Partitions `items` by `key_fn`, preserving input order inside each group.
pub fn group_by<T, K: Hash + Eq + Clone, I: IntoIterator<Item = T>, F: Fn(&T) -> K>(items: I, key_fn: F) -> Groups<K, T> {
	let mut result = Groups::new();
	for item in items {
		let k = key_fn(&item);
		result.push(k, item);
	}
	result
}


#[cfg(test)]
mod tests {
	use super::*;

	type Tagged = (u32, usize);

	fn by_key(a: &Tagged, b: &Tagged) -> Ordering {
		a.0.cmp(&b.0)
	}

	fn tagged(keys: &[u32]) -> Vec<Tagged> {
		keys.iter().cloned().enumerate().map(|(i, k)| (k, i)).collect()
	}

	fn bubble(v: &mut [Tagged], reverse: bool) {
		bubble_sort(v, by_key, reverse)
	}

	fn selection(v: &mut [Tagged], reverse: bool) {
		selection_sort(v, by_key, reverse)
	}

	fn insertion(v: &mut [Tagged], reverse: bool) {
		insertion_sort(v, by_key, reverse)
	}

	type InPlace = fn(&mut [Tagged], bool);

	fn in_place_sorts() -> [(&'static str, InPlace); 3] {
		[
			("bubble", bubble as InPlace),
			("selection", selection as InPlace),
			("insertion", insertion as InPlace),
		]
	}

	fn all_sorted(keys: &[u32], reverse: bool) -> Vec<(&'static str, Vec<Tagged>)> {
		let input = tagged(keys);
		let mut result = Vec::new();
		for (name, f) in in_place_sorts().iter().cloned() {
			let mut v = input.clone();
			f(&mut v, reverse);
			result.push((name, v));
		}
		result.push(("merge", merge_sort(&input, by_key, reverse)));
		result
	}

	#[test]
	fn sorts_are_stable_and_ordered() {
		let keys = [5, 3, 5, 1, 3, 3, 9, 0, 5];
		let mut expected = tagged(&keys);
		expected.sort_by_key(|(k, _)| *k);
		for (name, v) in all_sorted(&keys, false) {
			assert_eq!(v, expected, "{} sort", name);
		}
	}

	#[test]
	fn reverse_sorts_keep_ties_in_input_order() {
		let keys = [5, 3, 5, 1, 3, 3, 9, 0, 5];
		let mut expected = tagged(&keys);
		expected.sort_by(|a, b| b.0.cmp(&a.0));
		for (name, v) in all_sorted(&keys, true) {
			assert_eq!(v, expected, "{} sort", name);
		}
	}

	#[test]
	fn reverse_without_ties_is_exact_reverse() {
		let keys = [8, 2, 7, 1, 4];
		for ((name, fwd), (_, rev)) in all_sorted(&keys, false).into_iter().zip(all_sorted(&keys, true)) {
			let mut fwd = fwd;
			fwd.reverse();
			assert_eq!(fwd, rev, "{} sort", name);
		}
	}

	#[test]
	fn sorts_handle_trivial_inputs() {
		for (name, v) in all_sorted(&[], false) {
			assert!(v.is_empty(), "{} sort", name);
		}
		for (name, v) in all_sorted(&[4], true) {
			assert_eq!(v, vec![(4, 0)], "{} sort", name);
		}
	}

	#[test]
	fn merge_sort_does_not_mutate_input() {
		let input = vec![1, 3, 6, 2, 4, 5];
		let sorted = merge_sort(&input, |a: &i32, b: &i32| a.cmp(b), false);
		assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
		assert_eq!(input, vec![1, 3, 6, 2, 4, 5]);
		assert_eq!(sort(&input, |a: &i32, b: &i32| a.cmp(b), true), vec![6, 5, 4, 3, 2, 1]);
	}

	#[test]
	fn merge_of_sorted_halves_equals_sort_of_concatenation() {
		let a = tagged(&[4, 1, 7, 1]);
		let b: Vec<Tagged> = tagged(&[3, 7, 0]).into_iter().map(|(k, i)| (k, i + 10)).collect();
		let mut joined = a.clone();
		joined.extend_from_slice(&b);
		let merged = merge(&merge_sort(&a, by_key, false), &merge_sort(&b, by_key, false), by_key, false);
		assert_eq!(merged, merge_sort(&joined, by_key, false));

		let merged = merge(&merge_sort(&a, by_key, true), &merge_sort(&b, by_key, true), by_key, true);
		assert_eq!(merged, merge_sort(&joined, by_key, true));
	}

	#[test]
	fn merge_example() {
		let cmp = |a: &i32, b: &i32| a.cmp(b);
		assert_eq!(merge(&[1, 3, 6], &[2, 4, 5], cmp, false), vec![1, 2, 3, 4, 5, 6]);
		assert_eq!(merge(&[6, 4, 3], &[5, 2, 1], cmp, true), vec![6, 5, 4, 3, 2, 1]);
	}

	#[test]
	fn binary_search_finds_some_match() {
		let seq = [2, 4, 5, 6, 6, 6];
		let i = binary_search(&seq, &6).unwrap();
		assert_eq!(seq[i], 6);
		assert_eq!(binary_search(&seq, &2), Some(0));
		assert_eq!(binary_search(&seq, &10), None);
		assert_eq!(binary_search(&seq, &3), None);
		assert_eq!(binary_search::<i32>(&[], &3), None);
	}

	#[test]
	fn linear_search_returns_all_positions() {
		assert_eq!(linear_search(&[5, 2, 6, 4, 6, 6], &6), Some(vec![2, 4, 5]));
		assert_eq!(linear_search(&[6, 2, 5, 4, 1, 6], &10), None);
	}

	#[test]
	fn lower_bound_is_insertion_point() {
		let seq = [1, 3, 3, 7];
		assert_eq!(lower_bound(&seq, |v| *v, &0), 0);
		assert_eq!(lower_bound(&seq, |v| *v, &3), 1);
		assert_eq!(lower_bound(&seq, |v| *v, &4), 3);
		assert_eq!(lower_bound(&seq, |v| *v, &8), 4);
	}

	#[test]
	fn group_by_partitions_in_first_seen_order() {
		let input = vec!["apple", "bean", "avocado", "cherry", "banana", "apricot"];
		let groups = group_by(input.iter().cloned(), |s| s.chars().next().unwrap());
		let keys: Vec<char> = groups.keys().cloned().collect();
		assert_eq!(keys, vec!['a', 'b', 'c']);
		assert_eq!(groups.get(&'a').unwrap(), &["apple", "avocado", "apricot"][..]);
		assert_eq!(groups.get(&'b').unwrap(), &["bean", "banana"][..]);
		assert!(groups.get(&'z').is_none());

		let mut concatenated: Vec<&str> = groups.into_iter().flat_map(|(_, v)| v).collect();
		let mut original = input.clone();
		concatenated.sort();
		original.sort();
		assert_eq!(concatenated, original);
	}

	#[test]
	fn groups_insert_keeps_position() {
		let mut groups = group_by(vec![1, 2, 3, 4], |v| v % 2);
		let old = groups.insert(1, vec![9]);
		assert_eq!(old, Some(vec![1, 3]));
		assert_eq!(groups.keys().cloned().collect::<Vec<_>>(), vec![1, 0]);
		assert_eq!(groups.get(&1).unwrap(), &[9][..]);
		groups.clear();
		assert!(groups.is_empty());
	}

	#[test]
	fn filter_keeps_matching_in_order() {
		assert_eq!(filter(&[1, 2, 3, 4, 5], |v| v % 2 == 1), vec![1, 3, 5]);
	}
}
