use egress_primitives::{ActorAddr, FailureReason, SinkHandle, StreamSlot, StreamSlots};

use super::*;
use crate::message::DownstreamContent;
use crate::testing::Recorder;

const SOURCE: ActorAddr = ActorAddr(100);
const SINK_SLOT: StreamSlot = StreamSlot(40);

fn manager(batch_size: i32) -> DownstreamManager<u32> {
	DownstreamManager::new(SOURCE, StreamConfig::default().with_default_batch_size(batch_size).with_max_cache_len(64))
}

fn sink(id: u64) -> SinkHandle {
	SinkHandle::new(ActorAddr(id), format!("sink-{id}"))
}

fn ack_open(slot: StreamSlot, credit: i32, batch_size: i32) -> Upstream {
	Upstream::ack_open(StreamSlots::new(SINK_SLOT, slot), ActorAddr(1), credit, batch_size)
}

fn ack_batch(slot: StreamSlot, id: i64, credit: i32) -> Upstream {
	Upstream::ack_batch(StreamSlots::new(SINK_SLOT, slot), ActorAddr(1), id, credit)
}

#[test]
fn allocates_distinct_valid_slots() {
	let mut mgr = manager(4);
	let a = mgr.add_path(sink(1)).expect("slot");
	let b = mgr.add_path(sink(2).into_shared()).expect("slot");
	assert!(a.is_valid() && b.is_valid());
	assert_ne!(a, b);
	assert_eq!(mgr.len(), 2);
	assert_eq!(mgr.path(a).map(|p| p.desired_batch_size()), Some(4));
}

#[test]
fn push_respects_cache_bound_and_unknown_slots() {
	let mut mgr = manager(4);
	let slot = mgr.add_path(sink(1)).expect("slot");
	mgr.push(slot, 0..60).expect("fits");
	assert_eq!(mgr.push(slot, 0..5), Err(PathError::CacheFull { slot, limit: 64 }));
	assert_eq!(mgr.cache_len(slot), Some(60));
	assert_eq!(mgr.push(StreamSlot(999), [1]), Err(PathError::UnknownPath(StreamSlot(999))));
}

#[test]
fn handshake_starts_emission() {
	let rec = Recorder::new();
	let mut mgr = manager(4);
	let slot = mgr.add_path(sink(1)).expect("slot");
	mgr.push(slot, 0..10).expect("push");
	assert_eq!(mgr.emit_batches(&rec, false), 0, "pending path must not emit");

	let event = mgr.handle_upstream(&rec, ack_open(slot, 8, 0)).expect("open");
	assert_eq!(event, PathEvent::Retained);
	assert_eq!(rec.batch_sizes(), vec![4, 4]);
	assert_eq!(mgr.cache_len(slot), Some(2));
	assert_eq!(mgr.path(slot).map(|p| p.slots().receiver), Some(SINK_SLOT));
}

#[test]
fn acks_release_more_batches() {
	let rec = Recorder::new();
	let mut mgr = manager(5);
	let slot = mgr.add_path(sink(1)).expect("slot");
	mgr.push(slot, 0..20).expect("push");
	mgr.handle_upstream(&rec, ack_open(slot, 10, 5)).expect("open");
	assert_eq!(rec.batch_ids(), vec![0, 1]);

	mgr.handle_upstream(&rec, ack_batch(slot, 2, 10)).expect("ack");
	assert_eq!(rec.batch_ids(), vec![0, 1, 2, 3]);
	assert_eq!(mgr.cache_len(slot), Some(0));
}

#[test]
fn graceful_close_drains_then_removes() {
	let rec = Recorder::new();
	let mut mgr = manager(4);
	let slot = mgr.add_path(sink(1)).expect("slot");
	mgr.push(slot, 0..7).expect("push");
	mgr.handle_upstream(&rec, ack_open(slot, 5, 4)).expect("open");

	assert_eq!(mgr.close(&rec, slot), Ok(PathEvent::Retained));
	assert_eq!(rec.batch_sizes(), vec![4, 1]);
	assert_eq!(mgr.push(slot, [99]), Err(PathError::Closing(slot)));

	// Remaining two items ship once credit arrives; the close follows once clean.
	assert_eq!(mgr.handle_upstream(&rec, ack_batch(slot, 2, 4)), Ok(PathEvent::Retained));
	assert_eq!(rec.batch_sizes(), vec![4, 1, 2]);
	assert_eq!(mgr.handle_upstream(&rec, ack_batch(slot, 3, 4)), Ok(PathEvent::Removed));
	assert!(mgr.is_empty());

	let sent = rec.take();
	assert_eq!(sent.last().map(|(_, msg)| &msg.content), Some(&DownstreamContent::Close));
	assert_eq!(sent.iter().filter(|(_, msg)| msg.is_close()).count(), 1);
}

#[test]
fn closing_clean_empty_path_is_removed_immediately() {
	let rec: Recorder<u32> = Recorder::new();
	let mut mgr = manager(4);
	let slot = mgr.add_path(sink(1)).expect("slot");
	mgr.handle_upstream(&rec, ack_open(slot, 5, 4)).expect("open");
	assert_eq!(mgr.close(&rec, slot), Ok(PathEvent::Removed));
	assert_eq!(rec.take().pop().map(|(_, msg)| msg.content), Some(DownstreamContent::Close));
}

#[test]
fn closing_pending_path_uses_forced_close() {
	let rec = Recorder::new();
	let mut mgr = manager(4);
	let slot = mgr.add_path(sink(3)).expect("slot");
	mgr.push(slot, 0..3).expect("push");
	assert_eq!(mgr.close(&rec, slot), Ok(PathEvent::Removed));
	let sent = rec.take();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].0, ActorAddr(3));
	assert_eq!(sent[0].1.slots, StreamSlots::unbound(slot));
	assert_eq!(sent[0].1.content, DownstreamContent::ForcedClose(FailureReason::UserShutdown));
}

#[test]
fn protocol_violation_aborts_and_removes_path() {
	let rec = Recorder::new();
	let mut mgr = manager(4);
	let slot = mgr.add_path(sink(1)).expect("slot");
	mgr.push(slot, 0..4).expect("push");
	mgr.handle_upstream(&rec, ack_open(slot, 4, 4)).expect("open");
	assert!(!mgr.path(slot).expect("open path").clean());

	let err = mgr.handle_upstream(&rec, ack_batch(slot, 9, 1)).unwrap_err();
	let expected = FailureReason::UnexpectedAck {
		ack_id: 9,
		next_batch_id: 1,
	};
	assert_eq!(err, PathError::Protocol(expected.clone()));
	assert!(mgr.path(slot).is_none());
	assert_eq!(rec.take().pop().map(|(_, msg)| msg.content), Some(DownstreamContent::ForcedClose(expected)));
	// Batch 0 was still in flight; its ack no longer finds the path.
	assert_eq!(mgr.handle_upstream(&rec, ack_batch(slot, 1, 0)), Err(PathError::UnknownPath(slot)));
}

#[test]
fn abort_drops_unshipped_items_and_waits_for_acks() {
	let rec = Recorder::new();
	let mut mgr = manager(4);
	let slot = mgr.add_path(sink(1)).expect("slot");
	mgr.push(slot, 0..12).expect("push");
	mgr.handle_upstream(&rec, ack_open(slot, 4, 4)).expect("open");

	assert_eq!(mgr.abort(&rec, slot, "disk gone".into()), Ok(PathEvent::Retained));
	assert_eq!(mgr.cache_len(slot), Some(0));
	assert_eq!(mgr.handle_upstream(&rec, ack_batch(slot, 1, 4)), Ok(PathEvent::Removed));
	let sent = rec.take();
	assert_eq!(sent.iter().filter(|(_, msg)| msg.is_close()).count(), 1, "no extra close after forced close");
}

#[test]
fn sink_drop_removes_path_silently() {
	let rec: Recorder<u32> = Recorder::new();
	let mut mgr = manager(4);
	let a = mgr.add_path(sink(1)).expect("slot");
	let b = mgr.add_path(sink(2)).expect("slot");
	let graceful = Upstream {
		slots: StreamSlots::new(SINK_SLOT, a),
		sender: ActorAddr(1),
		content: UpstreamContent::Drop,
	};
	let forced = Upstream {
		slots: StreamSlots::new(SINK_SLOT, b),
		sender: ActorAddr(2),
		content: UpstreamContent::ForcedDrop(FailureReason::Unreachable),
	};
	assert_eq!(mgr.handle_upstream(&rec, graceful), Ok(PathEvent::Removed));
	assert_eq!(mgr.handle_upstream(&rec, forced), Ok(PathEvent::Removed));
	assert!(mgr.is_empty());
	assert_eq!(rec.len(), 0);
}

#[test]
fn upstream_for_unknown_slot_is_rejected() {
	let rec: Recorder<u32> = Recorder::new();
	let mut mgr = manager(4);
	assert_eq!(
		mgr.handle_upstream(&rec, ack_batch(StreamSlot(5), 0, 1)),
		Err(PathError::UnknownPath(StreamSlot(5)))
	);
}

#[test]
fn snapshots_are_ordered_by_slot() {
	let mut mgr = manager(4);
	let a = mgr.add_path(sink(1)).expect("slot");
	let b = mgr.add_path(sink(2)).expect("slot");
	let slots: Vec<_> = mgr.snapshots().into_iter().map(|s| s.slots.sender).collect();
	assert_eq!(slots, vec![a, b]);
}

#[test]
#[should_panic(expected = "invalid stream config")]
fn rejects_invalid_config() {
	let _ = DownstreamManager::<u32>::new(SOURCE, StreamConfig::default().with_default_batch_size(0));
}
