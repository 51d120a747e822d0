//! Hailstorm window selection.
//!
//! Every element of a window is hashed with CRC32. A window is kept when the
//! smallest of those hashes sits at its first or its last position. For a
//! window of `k` distinct elements that happens with probability `2/k`, and
//! because the decision only depends on the window's own content, an edit
//! only changes the selection around the edited region.
//!
//! The first window is always kept, and so is the final one unless it is
//! equal to the window emitted just before it. The selector is a single pass
//! adapter and holds on to two windows at most: the latest one seen and the
//! latest one emitted.

/// CRC32 of every element, in window order.
pub fn window_hashes<N: AsRef<[u8]>>(window: &[N]) -> Vec<u32> {
    window
        .iter()
        .map(|element| crc32fast::hash(element.as_ref()))
        .collect()
}

/// True when the minimum element hash is at the first or last position.
///
/// An empty window has no anchor.
pub fn is_anchored<N: AsRef<[u8]>>(window: &[N]) -> bool {
    let mut hashes = window
        .iter()
        .map(|element| crc32fast::hash(element.as_ref()));
    let Some(first) = hashes.next() else {
        return false;
    };
    let (min, last) = hashes.fold((first, first), |(min, _), hash| (min.min(hash), hash));
    min == first || min == last
}

/// Iterator adapter returned by [`select_windows`].
#[derive(Debug, Clone)]
pub struct Hailstorm<'a, I, N> {
    windows: I,
    position: usize,
    current: Option<&'a [N]>,
    last_emitted: Option<&'a [N]>,
    exhausted: bool,
}

/// Select representative windows from `windows`, preserving order.
///
/// ```
/// use perceptual::select_windows;
///
/// let grams: Vec<Vec<u8>> = (0..10).map(|i| format!("gram {i}").into_bytes()).collect();
/// let selected: Vec<_> = select_windows(grams.windows(4)).collect();
///
/// assert_eq!(selected.first(), grams.windows(4).next().as_ref());
/// assert_eq!(selected.last(), grams.windows(4).last().as_ref());
/// ```
pub fn select_windows<'a, I, N>(windows: I) -> Hailstorm<'a, I::IntoIter, N>
where
    I: IntoIterator<Item = &'a [N]>,
    N: AsRef<[u8]> + PartialEq + 'a,
{
    Hailstorm {
        windows: windows.into_iter(),
        position: 0,
        current: None,
        last_emitted: None,
        exhausted: false,
    }
}

impl<'a, I, N> Iterator for Hailstorm<'a, I, N>
where
    I: Iterator<Item = &'a [N]>,
    N: AsRef<[u8]> + PartialEq + 'a,
{
    type Item = &'a [N];

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        for window in self.windows.by_ref() {
            let position = self.position;
            self.position += 1;
            self.current = Some(window);
            if is_anchored(window) || position == 0 {
                self.last_emitted = Some(window);
                return Some(window);
            }
        }

        self.exhausted = true;
        match self.current {
            Some(current) if self.last_emitted != Some(current) => {
                self.last_emitted = Some(current);
                Some(current)
            }
            _ => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let (_, upper) = self.windows.size_hint();
        // One pending final window on top of whatever is left.
        (0, upper.and_then(|n| n.checked_add(1)))
    }
}

impl<'a, I, N> std::iter::FusedIterator for Hailstorm<'a, I, N>
where
    I: Iterator<Item = &'a [N]>,
    N: AsRef<[u8]> + PartialEq + 'a,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grams(prefix: &str, count: usize) -> Vec<Vec<u8>> {
        (0..count)
            .map(|i| format!("{prefix} {i}").into_bytes())
            .collect()
    }

    /// Windows whose minimum CRC32 is in the middle, so rule 3 never fires.
    fn unanchored_window() -> Vec<Vec<u8>> {
        let mut candidates = grams("probe", 64);
        candidates.sort_by_key(|g| crc32fast::hash(g));
        // min in the middle: [second smallest, smallest, third smallest]
        vec![
            candidates[1].clone(),
            candidates[0].clone(),
            candidates[2].clone(),
        ]
    }

    #[test]
    fn window_hashes_are_crc32() {
        let window = [b"abc".to_vec(), b"".to_vec()];
        assert_eq!(window_hashes(&window), vec![0x3524_41c2, 0]);
    }

    #[test]
    fn anchored_when_min_at_an_end() {
        let mut sorted = grams("a", 5);
        sorted.sort_by_key(|g| crc32fast::hash(g));
        assert!(is_anchored(&sorted));

        sorted.reverse();
        assert!(is_anchored(&sorted));

        assert!(!is_anchored(&unanchored_window()));
    }

    #[test]
    fn single_element_window_is_anchored() {
        assert!(is_anchored(&[b"only".to_vec()]));
    }

    #[test]
    fn empty_window_is_not_anchored() {
        let empty: [Vec<u8>; 0] = [];
        assert!(!is_anchored(&empty));
    }

    #[test]
    fn empty_input_selects_nothing() {
        let windows: Vec<Vec<Vec<u8>>> = Vec::new();
        assert_eq!(select_windows(windows.iter().map(Vec::as_slice)).count(), 0);
    }

    #[test]
    fn single_window_is_emitted_once() {
        let windows = vec![unanchored_window()];
        let selected: Vec<_> = select_windows(windows.iter().map(Vec::as_slice)).collect();
        assert_eq!(selected, vec![windows[0].as_slice()]);

        let anchored = vec![grams("z", 1)];
        let selected: Vec<_> = select_windows(anchored.iter().map(Vec::as_slice)).collect();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn unanchored_first_and_last_are_forced() {
        let mut other = unanchored_window();
        other.swap(0, 2);
        let windows = vec![unanchored_window(), other.clone(), other.clone(), other];
        // Nothing is anchored: only the two boundaries survive.
        let selected: Vec<_> = select_windows(windows.iter().map(Vec::as_slice)).collect();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0], windows[0].as_slice());
        assert_eq!(selected[1], windows[3].as_slice());
    }

    #[test]
    fn final_window_equal_to_last_emitted_is_not_repeated() {
        // Only the forced first window is emitted; the final window has the
        // same content, so it is not emitted a second time.
        let x = unanchored_window();
        let mut y = unanchored_window();
        y.swap(0, 2);
        let windows = vec![x.clone(), y, x];
        let selected: Vec<_> = select_windows(windows.iter().map(Vec::as_slice)).collect();
        assert_eq!(selected, vec![windows[0].as_slice()]);
    }

    #[test]
    fn anchored_windows_are_all_kept() {
        let mut sorted = grams("s", 40);
        sorted.sort_by_key(|g| crc32fast::hash(g));
        // Every window of a hash-sorted sequence has its minimum first.
        let windows: Vec<&[Vec<u8>]> = sorted.windows(5).collect();
        let selected: Vec<_> = select_windows(windows.iter().copied()).collect();
        assert_eq!(selected, windows);
    }

    #[test]
    fn is_fused() {
        let windows = vec![grams("f", 3)];
        let mut it = select_windows(windows.iter().map(Vec::as_slice));
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    proptest! {
        #[test]
        fn boundaries_kept_and_order_preserved(
            seeds in proptest::collection::vec(0u16..50, 1..40),
            width in 1usize..6,
        ) {
            let elements: Vec<Vec<u8>> = seeds.iter().map(|s| s.to_le_bytes().to_vec()).collect();
            let windows: Vec<&[Vec<u8>]> = elements.windows(width.min(elements.len())).collect();
            let selected: Vec<&[Vec<u8>]> = select_windows(windows.iter().copied()).collect();

            prop_assert!(!selected.is_empty());
            prop_assert!(selected.len() <= windows.len());
            prop_assert_eq!(selected[0], windows[0]);
            prop_assert!(selected.contains(windows.last().unwrap()));

            // subsequence by position
            let mut cursor = 0;
            for window in &selected {
                let found = windows[cursor..].iter().position(|w| w == window);
                prop_assert!(found.is_some());
                cursor += found.unwrap() + 1;
            }
        }
    }
}
