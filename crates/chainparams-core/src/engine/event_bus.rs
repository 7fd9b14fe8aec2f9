//! Broadcast bus for engine events.

use chainparams_types::ChainParamsEvent;
use tokio::sync::broadcast;

/// Events kept for subscribers that fall behind.
const DEFAULT_CAPACITY: usize = 1000;

/// Multi-subscriber event bus.
///
/// Publishing never blocks. A subscriber that lags more than the channel
/// capacity loses the oldest events and sees a `Lagged` error on its next
/// receive.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<ChainParamsEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ChainParamsEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event, returning the number of subscribers reached.
	/// Fails only when nobody is subscribed.
	pub fn publish(
		&self,
		event: ChainParamsEvent,
	) -> Result<usize, broadcast::error::SendError<ChainParamsEvent>> {
		self.sender.send(event)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}
