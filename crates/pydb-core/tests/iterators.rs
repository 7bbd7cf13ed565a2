//! Tests for interpreter, thread, and frame list walks

mod common;

use common::FakeProcess;
use pydb_core::layout::Layout;
use pydb_core::{Address, Agent, AgentConfig, DataModel, IterKind, IterState, PydbError, PYDB_VERSION};

const RUNTIME: &str = "libpython3.5m.so";

#[test]
fn test_frame_chain_lengths()
{
    for model in [DataModel::Ilp32, DataModel::Lp64] {
        for count in 0..=5 {
            let mut process = FakeProcess::new(model);
            let frames = process.frame_chain(count);
            let top = frames.first().copied().unwrap_or(Address::ZERO);
            let thread = process.thread(Address::ZERO, top);
            let agent = Agent::create(&process, PYDB_VERSION).unwrap();

            let mut iter = agent.frame_iter(thread).unwrap();
            assert_eq!(iter.kind(), IterKind::Frame);

            let mut walked = Vec::new();
            while let Some(frame) = iter.advance() {
                walked.push(frame);
            }
            assert_eq!(walked, frames, "{model} chain of {count}");

            assert_eq!(iter.state(), IterState::Exhausted);
            assert_eq!(iter.advance(), None);
            assert_eq!(iter.advance(), None);
            iter.fini();
        }
    }
}

#[test]
fn test_iterator_adaptor()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let frames = process.frame_chain(3);
    let thread = process.thread(Address::ZERO, frames[0]);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    let collected: Vec<Address> = agent.frame_iter(thread).unwrap().collect();
    assert_eq!(collected, frames);

    let mut fused = agent.frame_iter(thread).unwrap().skip(2);
    assert_eq!(fused.next(), Some(frames[2]));
    assert_eq!(fused.next(), None);
    assert_eq!(fused.next(), None);
}

#[test]
fn test_walk_threads()
{
    let mut process = FakeProcess::new(DataModel::Ilp32);
    let third = process.thread(Address::ZERO, Address::ZERO);
    let second = process.thread(third, Address::ZERO);
    let first = process.thread(second, Address::ZERO);
    let interp = process.interpreter(Address::ZERO, first);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    let iter = agent.thread_iter(interp).unwrap();
    assert_eq!(iter.kind(), IterKind::Thread);
    assert_eq!(iter.state(), IterState::Active(first));
    assert_eq!(iter.collect::<Vec<_>>(), [first, second, third]);
}

#[test]
fn test_thread_without_frames()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let thread = process.thread(Address::ZERO, Address::ZERO);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    let mut iter = agent.frame_iter(thread).unwrap();
    assert_eq!(iter.advance(), None);
    assert_eq!(iter.state(), IterState::Exhausted);
}

#[test]
fn test_unreadable_roots_fail_creation()
{
    let process = FakeProcess::new(DataModel::Lp64);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();
    let missing = Address::new(0x6000_0000);

    assert!(matches!(agent.thread_iter(missing), Err(PydbError::ReadFault { .. })));
    assert!(matches!(agent.frame_iter(missing), Err(PydbError::ReadFault { .. })));
}

#[test]
fn test_walk_interpreters_from_symbol()
{
    for model in [DataModel::Ilp32, DataModel::Lp64] {
        let mut process = FakeProcess::new(model);
        let thread = process.thread(Address::ZERO, Address::ZERO);
        let second = process.interpreter(Address::ZERO, thread);
        let first = process.interpreter(second, Address::ZERO);
        let head = process.pointer_cell(first);
        process.add_symbol(RUNTIME, "interp_head", head, model.pointer_size() as u64);
        let agent = Agent::create(&process, PYDB_VERSION).unwrap();

        let iter = agent.interpreter_iter(None).unwrap();
        assert_eq!(iter.kind(), IterKind::Interpreter);
        let interps: Vec<_> = iter.collect();
        assert_eq!(interps, [first, second]);

        // Walking all the way down.
        let threads: Vec<_> = interps
            .iter()
            .flat_map(|&interp| agent.thread_iter(interp).unwrap())
            .collect();
        assert_eq!(threads, [thread]);
    }
}

#[test]
fn test_walk_interpreters_from_explicit_head()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let only = process.interpreter(Address::ZERO, Address::ZERO);
    let head = process.pointer_cell(only);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    assert_eq!(agent.interpreter_iter(Some(head)).unwrap().collect::<Vec<_>>(), [only]);
}

#[test]
fn test_head_symbol_in_executable()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let only = process.interpreter(Address::ZERO, Address::ZERO);
    let head = process.pointer_cell(only);
    process.add_symbol(pydb_core::remote::EXECUTABLE_OBJECT, "interp_head", head, 8);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    // A null head means "resolve the symbol".
    assert_eq!(agent.interpreter_iter(Some(Address::ZERO)).unwrap().count(), 1);
}

#[test]
fn test_configured_head_symbol()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let only = process.interpreter(Address::ZERO, Address::ZERO);
    let head = process.pointer_cell(only);
    process.add_symbol(RUNTIME, "_PyRuntime_interp_head", head, 8);
    let config = AgentConfig::default().with_interp_head_symbol("_PyRuntime_interp_head");
    let agent = Agent::with_config(&process, PYDB_VERSION, config).unwrap();

    assert_eq!(agent.interpreter_iter(None).unwrap().count(), 1);
}

#[test]
fn test_missing_head_symbol()
{
    let process = FakeProcess::new(DataModel::Lp64);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    match agent.interpreter_iter(None) {
        Err(PydbError::SymbolNotFound { object, symbol, .. }) => {
            assert_eq!(object, RUNTIME);
            assert_eq!(symbol, "interp_head");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("walk started without a head symbol"),
    }
}

#[test]
fn test_empty_interpreter_list()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let head = process.pointer_cell(Address::ZERO);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    let mut iter = agent.interpreter_iter(Some(head)).unwrap();
    assert_eq!(iter.advance(), None);
    assert_eq!(iter.state(), IterState::Exhausted);
}

#[test]
fn test_unmapped_link_ends_walk()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let frames = process.frame_chain(4);
    let thread = process.thread(Address::ZERO, frames[0]);
    process.unmap(frames[2]);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    let mut iter = agent.frame_iter(thread).unwrap();
    assert_eq!(iter.advance(), Some(frames[0]));
    assert_eq!(iter.advance(), Some(frames[1]));
    assert_eq!(iter.advance(), None);
    assert_eq!(iter.state(), IterState::Exhausted);
    assert_eq!(iter.advance(), None);
}

#[test]
fn test_self_link_ends_walk()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let frames = process.frame_chain(2);
    let thread = process.thread(Address::ZERO, frames[0]);
    let f_back = Layout::for_model(DataModel::Lp64).frame.f_back;
    process.patch_pointer(frames[1], f_back, frames[1]);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    assert_eq!(agent.frame_iter(thread).unwrap().collect::<Vec<_>>(), frames);
}

#[test]
fn test_iterators_are_independent()
{
    let mut process = FakeProcess::new(DataModel::Lp64);
    let frames = process.frame_chain(3);
    let thread = process.thread(Address::ZERO, frames[0]);
    let agent = Agent::create(&process, PYDB_VERSION).unwrap();

    let mut a = agent.frame_iter(thread).unwrap();
    let mut b = agent.frame_iter(thread).unwrap();
    assert_eq!(a.advance(), Some(frames[0]));
    assert_eq!(a.advance(), Some(frames[1]));
    assert_eq!(b.advance(), Some(frames[0]));
    assert_eq!(a.state(), IterState::Active(frames[2]));
    assert_eq!(b.state(), IterState::Active(frames[1]));
}
