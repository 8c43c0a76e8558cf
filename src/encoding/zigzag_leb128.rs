//! Zig-zag on `n` bits: `(x << 1) ^ (x >> (n-1))`, followed by ULEB128.

use super::uleb128;

pub fn encode(value: i64) -> ([u8; 10], usize) {
    let zigzagged = ((value << 1) ^ (value >> 63)) as u64;
    let mut container = [0u8; 10];
    let used = uleb128::encode(zigzagged, &mut container);
    (container, used)
}

pub fn decode(values: &[u8]) -> (i64, usize) {
    let (u, consumed) = uleb128::decode(values);
    ((u >> 1) as i64 ^ -((u & 1) as i64), consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        // see e.g. https://stackoverflow.com/a/2211086/931303
        let cases = vec![
            (0u8, 0i64),
            (1, -1),
            (2, 1),
            (3, -2),
            (4, 2),
            (5, -3),
            (6, 3),
            (7, -4),
            (8, 4),
            (9, -5),
        ];
        for (data, expected) in cases {
            let (result, _) = decode(&[data]);
            assert_eq!(result, expected)
        }
    }

    #[test]
    fn roundtrip() {
        for v in [0i64, -1, 1, i64::MIN, i64::MAX, -12345, 12345] {
            let (container, used) = encode(v);
            let (decoded, consumed) = decode(&container[..used]);
            assert_eq!(decoded, v);
            assert_eq!(consumed, used);
        }
    }
}
