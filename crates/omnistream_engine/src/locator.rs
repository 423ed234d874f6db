use omnistream_core::Platform;
use sha2::{Digest, Sha256};

/// Deterministic public URL for a simulated upload: `https://{platform}.com/video/{hash}`.
pub fn simulated_locator(platform: Platform) -> String {
    let id = platform.id().to_ascii_lowercase();
    format!("https://{id}.com/video/{}", short_hash(&id))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
