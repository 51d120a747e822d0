/// Slides a window of `n` items over `items` with a step of one.
///
/// Yields `items.len() - n + 1` borrowed slices, in order. A sequence shorter
/// than `n` yields nothing, and so does `n == 0`.
///
/// ```
/// use canonical::ngrams;
///
/// let grams: Vec<&[u32]> = ngrams(&[1u32, 2, 3, 4], 3).collect();
/// assert_eq!(grams, vec![&[1u32, 2, 3][..], &[2u32, 3, 4][..]]);
/// ```
pub fn ngrams<T>(items: &[T], n: usize) -> std::slice::Windows<'_, T> {
    // `windows` rejects a zero size; one past the length produces no window.
    let size = if n == 0 { items.len() + 1 } else { n };
    items.windows(size)
}
