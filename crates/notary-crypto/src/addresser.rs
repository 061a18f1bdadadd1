use notary_types::Fingerprint;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::algorithm::FingerprintAlgorithm;

/// Read size used by [`ContentAddresser::fingerprint_reader`].
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Incremental content hasher.
///
/// Absorbs a byte stream through [`update`](Self::update) and produces a
/// [`Fingerprint`] over the exact concatenation of every slice, in call order.
/// [`finalize`](Self::finalize) consumes the accumulator, so it cannot be fed
/// after the digest is taken.
pub struct ContentAddresser {
    state: HashState,
    absorbed: u64,
}

enum HashState {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl ContentAddresser {
    pub fn new(algorithm: FingerprintAlgorithm) -> Self {
        let state = match algorithm {
            FingerprintAlgorithm::Sha256 => HashState::Sha256(Sha256::new()),
            FingerprintAlgorithm::Blake3 => HashState::Blake3(Box::new(blake3::Hasher::new())),
        };
        Self { state, absorbed: 0 }
    }

    /// Absorb the next slice of the stream. Empty slices are accepted.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HashState::Sha256(h) => h.update(data),
            HashState::Blake3(h) => {
                h.update(data);
            }
        }
        self.absorbed += data.len() as u64;
    }

    /// Total bytes absorbed so far.
    pub fn bytes_absorbed(&self) -> u64 {
        self.absorbed
    }

    pub fn algorithm(&self) -> FingerprintAlgorithm {
        match self.state {
            HashState::Sha256(_) => FingerprintAlgorithm::Sha256,
            HashState::Blake3(_) => FingerprintAlgorithm::Blake3,
        }
    }

    /// Produce the fingerprint of everything absorbed.
    pub fn finalize(self) -> Fingerprint {
        let digest: [u8; 32] = match self.state {
            HashState::Sha256(h) => h.finalize().into(),
            HashState::Blake3(h) => *h.finalize().as_bytes(),
        };
        Fingerprint::from_digest(digest)
    }

    /// One-shot fingerprint of a complete buffer.
    pub fn fingerprint(algorithm: FingerprintAlgorithm, data: &[u8]) -> Fingerprint {
        let mut addresser = Self::new(algorithm);
        addresser.update(data);
        addresser.finalize()
    }

    /// Fingerprint everything `reader` yields until EOF. Returns the
    /// fingerprint and the number of bytes read.
    pub async fn fingerprint_reader<R>(
        algorithm: FingerprintAlgorithm,
        reader: &mut R,
    ) -> std::io::Result<(Fingerprint, u64)>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut addresser = Self::new(algorithm);
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            addresser.update(&buf[..n]);
        }
        let bytes = addresser.absorbed;
        Ok((addresser.finalize(), bytes))
    }
}

impl std::fmt::Debug for ContentAddresser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAddresser")
            .field("algorithm", &self.algorithm())
            .field("absorbed", &self.absorbed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sha256_known_vectors() {
        assert_eq!(
            ContentAddresser::fingerprint(FingerprintAlgorithm::Sha256, b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            ContentAddresser::fingerprint(FingerprintAlgorithm::Sha256, b"abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn blake3_known_vector() {
        assert_eq!(
            ContentAddresser::fingerprint(FingerprintAlgorithm::Blake3, b"").as_str(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn algorithms_disagree() {
        let data = b"same content";
        assert_ne!(
            ContentAddresser::fingerprint(FingerprintAlgorithm::Sha256, data),
            ContentAddresser::fingerprint(FingerprintAlgorithm::Blake3, data)
        );
    }

    #[test]
    fn empty_updates_are_absorbed() {
        let mut a = ContentAddresser::new(FingerprintAlgorithm::Sha256);
        a.update(b"");
        a.update(b"abc");
        a.update(b"");
        assert_eq!(a.bytes_absorbed(), 3);
        assert_eq!(
            a.finalize(),
            ContentAddresser::fingerprint(FingerprintAlgorithm::Sha256, b"abc")
        );
    }

    #[test]
    fn order_matters() {
        let mut ab = ContentAddresser::new(FingerprintAlgorithm::Sha256);
        ab.update(b"a");
        ab.update(b"b");
        let mut ba = ContentAddresser::new(FingerprintAlgorithm::Sha256);
        ba.update(b"b");
        ba.update(b"a");
        assert_ne!(ab.finalize(), ba.finalize());
    }

    #[test]
    fn debug_reports_algorithm() {
        let a = ContentAddresser::new(FingerprintAlgorithm::Blake3);
        let s = format!("{a:?}");
        assert!(s.contains("Blake3"));
    }

    #[tokio::test]
    async fn reader_spanning_several_buffers_matches_one_shot() {
        let data = vec![0xa5u8; READ_BUFFER_SIZE * 2 + 5];
        let mut reader: &[u8] = &data;
        let (fp, bytes) = ContentAddresser::fingerprint_reader(FingerprintAlgorithm::Sha256, &mut reader)
            .await
            .unwrap();
        assert_eq!(bytes, data.len() as u64);
        assert_eq!(fp, ContentAddresser::fingerprint(FingerprintAlgorithm::Sha256, &data));
    }

    fn split_at_points(data: &[u8], mut points: Vec<usize>) -> Vec<&[u8]> {
        points.iter_mut().for_each(|p| *p %= data.len() + 1);
        points.sort_unstable();
        let mut chunks = Vec::new();
        let mut start = 0;
        for p in points {
            chunks.push(&data[start..p]);
            start = p;
        }
        chunks.push(&data[start..]);
        chunks
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_fingerprint(
            data in proptest::collection::vec(any::<u8>(), 0..4096),
            points in proptest::collection::vec(any::<usize>(), 0..16),
            blake in any::<bool>(),
        ) {
            let algorithm = if blake { FingerprintAlgorithm::Blake3 } else { FingerprintAlgorithm::Sha256 };
            let whole = ContentAddresser::fingerprint(algorithm, &data);

            let mut chunked = ContentAddresser::new(algorithm);
            for chunk in split_at_points(&data, points) {
                chunked.update(chunk);
            }
            prop_assert_eq!(chunked.bytes_absorbed(), data.len() as u64);
            prop_assert_eq!(chunked.finalize(), whole);
        }
    }
}
