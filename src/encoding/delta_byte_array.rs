//! DELTA_BYTE_ARRAY: each value after the first is stored as a shared
//! prefix length (vs. the previous value) plus its suffix. Two
//! delta-packed blocks (prefix lengths, suffix lengths) precede the
//! concatenated suffix bytes.

use super::delta_bitpacked;

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

pub fn encode(values: &[&[u8]], out: &mut Vec<u8>) {
    let mut prefix_lengths = Vec::with_capacity(values.len());
    let mut suffixes: Vec<&[u8]> = Vec::with_capacity(values.len());

    let mut prev: &[u8] = &[];
    for &v in values {
        let prefix_len = common_prefix_len(prev, v);
        prefix_lengths.push(prefix_len as i64);
        suffixes.push(&v[prefix_len..]);
        prev = v;
    }

    let suffix_lengths: Vec<i64> = suffixes.iter().map(|s| s.len() as i64).collect();

    delta_bitpacked::encode(&prefix_lengths, out);
    delta_bitpacked::encode(&suffix_lengths, out);
    for s in suffixes {
        out.extend_from_slice(s);
    }
}
