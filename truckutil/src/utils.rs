pub fn prettyprint_usize(x: usize) -> String {
    let num = x.to_string();
    let mut result = String::new();
    let mut i = num.len();
    for c in num.chars() {
        result.push(c);
        i -= 1;
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
    }
    result
}

/// Split items into `num_chunks` contiguous pieces whose sizes differ by at most one. The first
/// `len % num_chunks` pieces get the extra item. Order is preserved, and every chunk is returned,
/// even if it winds up empty.
pub fn split_into_chunks<T>(items: Vec<T>, num_chunks: usize) -> Vec<Vec<T>> {
    let num_chunks = num_chunks.max(1);
    let base = items.len() / num_chunks;
    let extra = items.len() % num_chunks;

    let mut chunks = Vec::with_capacity(num_chunks);
    let mut iter = items.into_iter();
    for idx in 0..num_chunks {
        let size = if idx < extra { base + 1 } else { base };
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}
