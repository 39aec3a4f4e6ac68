/// Failures from the CBOR assembly layer: malformed attachments supplied
/// by the caller, or an encoding step that could not round-trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CborError {
    #[error("could not decode script bytes")]
    MalformedScript,
    #[error("could not decode datum bytes")]
    MalformedDatum,
    #[error("asset name must be 32 bytes or less")]
    AssetNameTooLong,
    #[error("invalid network id")]
    InvalidNetworkId,
    #[error("failed to encode fragment to cbor")]
    EncodingFailed,
}
