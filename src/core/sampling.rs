const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// 依照 id 的雜湊值決定是否保留這筆記錄。
/// 同一組 (id, modulus) 永遠得到同樣的結果；modulus 為 0 或 1 時全部保留。
pub fn sample(id: &str, modulus: u32) -> bool {
    match modulus {
        0 | 1 => true,
        m => fnv1a_32(id.as_bytes()) % m == 0,
    }
}
