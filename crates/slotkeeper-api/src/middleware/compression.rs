//! Response compression layer.

use tower_http::compression::{CompressionLayer, predicate::SizeAbove};

/// Builds a gzip compression layer.
///
/// Responses below 256 bytes (error bodies, single slots) are sent as is.
pub fn build_compression_layer() -> CompressionLayer<SizeAbove> {
    CompressionLayer::new()
        .gzip(true)
        .compress_when(tower_http::compression::predicate::SizeAbove::new(256))
}
