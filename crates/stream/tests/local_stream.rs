//! Source and sink exchanging stream messages through a [`LocalDirectory`].

use egress_primitives::{ActorAddr, LocalDirectory, SinkHandle, StreamSlot, StreamSlots};
use egress_stream::{Downstream, DownstreamContent, DownstreamManager, PathEvent, StreamConfig, Upstream};
use tokio::sync::mpsc::UnboundedReceiver;
use {proptest as _, serde as _, thiserror as _, toml as _, tracing as _};

const SOURCE: ActorAddr = ActorAddr(1);
const SINK: ActorAddr = ActorAddr(2);
const SINK_SLOT: StreamSlot = StreamSlot(77);

fn drain(rx: &mut UnboundedReceiver<Downstream<u64>>) -> Vec<Downstream<u64>> {
	let mut out = Vec::new();
	while let Ok(msg) = rx.try_recv() {
		out.push(msg);
	}
	out
}

#[tokio::test]
async fn stream_runs_to_completion_under_credit() {
	let directory: LocalDirectory<Downstream<u64>> = LocalDirectory::new();
	let mut sink_rx = directory.register(SINK);
	let config = StreamConfig::from_toml_str("default_batch_size = 10\nmax_cache_len = 100").expect("config");
	let mut mgr = DownstreamManager::new(SOURCE, config);

	let slot = mgr.add_path(SinkHandle::new(SINK, "collector")).expect("slot");
	mgr.push(slot, 0..25).expect("push");
	let upstream = |id, credit| Upstream::ack_batch(StreamSlots::new(SINK_SLOT, slot), SINK, id, credit);

	mgr.handle_upstream(&directory, Upstream::ack_open(StreamSlots::new(SINK_SLOT, slot), SINK, 22, 0))
		.expect("open");
	let first = drain(&mut sink_rx);
	assert_eq!(first.iter().filter_map(|m| m.batch().map(|b| b.xs_size)).collect::<Vec<_>>(), vec![10, 10]);
	assert!(first.iter().all(|m| m.slots == StreamSlots::new(slot, SINK_SLOT) && m.sender == SOURCE));

	assert_eq!(mgr.close(&directory, slot), Ok(PathEvent::Retained));
	let tail = drain(&mut sink_rx);
	assert_eq!(tail.iter().filter_map(|m| m.batch().map(|b| b.xs_size)).collect::<Vec<_>>(), vec![2]);
	assert_eq!(mgr.path(slot).map(|p| p.open_credit()), Some(0));

	assert_eq!(mgr.handle_upstream(&directory, upstream(3, 10)), Ok(PathEvent::Retained));
	let rest = drain(&mut sink_rx);
	assert_eq!(rest.iter().filter_map(|m| m.batch().map(|b| b.id)).collect::<Vec<_>>(), vec![3]);

	assert_eq!(mgr.handle_upstream(&directory, upstream(4, 10)), Ok(PathEvent::Removed));
	let last = drain(&mut sink_rx);
	assert_eq!(last.len(), 1);
	assert_eq!(last[0].content, DownstreamContent::Close);

	let items: Vec<u64> = first
		.into_iter()
		.chain(tail)
		.chain(rest)
		.filter_map(|m| match m.content {
			DownstreamContent::Batch(b) => Some(b.xs),
			_ => None,
		})
		.flatten()
		.collect();
	assert_eq!(items, (0..25).collect::<Vec<_>>());
	assert!(mgr.is_empty());
}

#[tokio::test]
async fn emission_to_terminated_sink_is_silent() {
	let directory: LocalDirectory<Downstream<u64>> = LocalDirectory::new();
	drop(directory.register(SINK));
	let mut mgr = DownstreamManager::new(SOURCE, StreamConfig::default());
	let slot = mgr.add_path(SinkHandle::new(SINK, "gone")).expect("slot");
	mgr.push(slot, 0..5).expect("push");
	mgr.handle_upstream(&directory, Upstream::ack_open(StreamSlots::new(SINK_SLOT, slot), SINK, 5, 5))
		.expect("open");
	assert_eq!(mgr.path(slot).map(|p| p.next_batch_id()), Some(1));
	assert!(!directory.contains(SINK));
}
