//! Fragment streams: turning a provider's chunk channel into reply text.
//!
//! The channel is wrapped as a finite [`Stream`] of text fragments. Display
//! and buffering are independent consumers of that stream: the caller's
//! callback observes each fragment through `inspect`, and the full reply is
//! accumulated with a fold.

use futures::{Stream, StreamExt, TryStreamExt, future};
use promptsh_core::ProviderError;
use promptsh_core::provider::ChunkReceiver;
use tokio_stream::wrappers::ReceiverStream;

/// Non-empty text fragments in arrival order; ends when the provider closes
/// the channel.
pub fn fragments(rx: ChunkReceiver) -> impl Stream<Item = Result<String, ProviderError>> {
    ReceiverStream::new(rx)
        .map(|chunk| chunk.map(|c| c.content.unwrap_or_default()))
        .try_filter(|fragment| future::ready(!fragment.is_empty()))
}

/// Drain `rx`, calling `on_fragment` for each fragment, and return the
/// concatenated reply. The first error ends the stream.
pub async fn collect_reply<F>(rx: ChunkReceiver, mut on_fragment: F) -> Result<String, ProviderError>
where
    F: FnMut(&str),
{
    fragments(rx)
        .inspect(|item| {
            if let Ok(fragment) = item {
                on_fragment(fragment);
            }
        })
        .try_fold(String::new(), |mut reply, fragment| {
            reply.push_str(&fragment);
            future::ready(Ok(reply))
        })
        .await
}
