//! In-memory stand-in for an inspected process.
//!
//! `FakeProcess` is both the remote image and the tool that lays runtime
//! objects out inside it, using the same layout tables as the decoders.
//! Regions are separated by unmapped gaps so any over-read faults.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use pydb_core::layout::{Layout, STATE_ASCII, STATE_COMPACT, STATE_READY};
use pydb_core::{Address, DataModel, RemoteFault, RemoteProcess, SymbolInfo};

/// `PyUnicode_1BYTE_KIND` in the state bitfield.
pub const KIND_1BYTE: u32 = 1 << 2;
/// State of a compact ASCII string as the runtime creates it.
pub const ASCII_STATE: u32 = KIND_1BYTE | STATE_COMPACT | STATE_ASCII | STATE_READY;

const BASE: u64 = 0x0001_0000;
const GAP: u64 = 0x40;

fn put_pointer(model: DataModel, buf: &mut [u8], offset: usize, value: Address)
{
    match model {
        DataModel::Ilp32 => {
            let value = u32::try_from(value.value()).expect("address fits in 32 bits");
            buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
        }
        DataModel::Lp64 => buf[offset..offset + 8].copy_from_slice(&value.value().to_ne_bytes()),
    }
}

pub struct FakeProcess
{
    model: DataModel,
    model_fault: Option<RemoteFault>,
    regions: BTreeMap<u64, Vec<u8>>,
    symbols: HashMap<(String, String), SymbolInfo>,
    next: u64,
    pub model_queries: Cell<usize>,
    pub reads: Cell<usize>,
}

impl FakeProcess
{
    pub fn new(model: DataModel) -> Self
    {
        pydb_utils::init_test_logging();
        Self {
            model,
            model_fault: None,
            regions: BTreeMap::new(),
            symbols: HashMap::new(),
            next: BASE,
            model_queries: Cell::new(0),
            reads: Cell::new(0),
        }
    }

    /// A process whose data model query fails.
    pub fn without_model() -> Self
    {
        let mut process = Self::new(DataModel::native());
        process.model_fault = Some(RemoteFault::DataModel("no auxv".to_string()));
        process
    }

    pub fn layout(&self) -> &'static Layout
    {
        Layout::for_model(self.model)
    }

    pub fn model(&self) -> DataModel
    {
        self.model
    }

    /// Map `bytes` at a fresh address.
    pub fn map(&mut self, bytes: Vec<u8>) -> Address
    {
        let address = self.next;
        let len = bytes.len().max(1) as u64;
        self.next = (address + len + GAP + 0xf) & !0xf;
        self.regions.insert(address, bytes);
        Address::new(address)
    }

    /// Remove the region starting at `address`.
    pub fn unmap(&mut self, address: Address)
    {
        self.regions.remove(&address.value());
    }

    pub fn add_symbol(&mut self, object: &str, name: &str, address: Address, size: u64)
    {
        self.symbols
            .insert((object.to_string(), name.to_string()), SymbolInfo::new(address, size));
    }

    fn put_pointer(&self, buf: &mut [u8], offset: usize, value: Address)
    {
        put_pointer(self.model, buf, offset, value);
    }

    fn put_ssize(&self, buf: &mut [u8], offset: usize, value: i64)
    {
        match self.model {
            DataModel::Ilp32 => {
                let value = i32::try_from(value).expect("size fits in 32 bits");
                buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
            }
            DataModel::Lp64 => buf[offset..offset + 8].copy_from_slice(&value.to_ne_bytes()),
        }
    }

    fn put_u32(buf: &mut [u8], offset: usize, value: u32)
    {
        buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    }

    fn put_i32(buf: &mut [u8], offset: usize, value: i32)
    {
        buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    }

    /// Overwrite a pointer field of an already mapped record.
    pub fn patch_pointer(&mut self, record: Address, offset: usize, value: Address)
    {
        let model = self.model;
        let region = self.regions.get_mut(&record.value()).expect("record is mapped");
        put_pointer(model, region, offset, value);
    }

    /// A global pointer variable holding `value`.
    pub fn pointer_cell(&mut self, value: Address) -> Address
    {
        let mut buf = vec![0u8; self.model.pointer_size()];
        self.put_pointer(&mut buf, 0, value);
        self.map(buf)
    }

    /// Bytes object with an explicit `ob_size`, followed by `payload`.
    pub fn bytes_with_size(&mut self, declared: i64, payload: &[u8]) -> Address
    {
        let layout = self.layout().bytes;
        let mut buf = vec![0u8; layout.ob_sval];
        self.put_ssize(&mut buf, layout.ob_size, declared);
        buf.extend_from_slice(payload);
        buf.push(0);
        self.map(buf)
    }

    pub fn bytes(&mut self, payload: &[u8]) -> Address
    {
        self.bytes_with_size(payload.len() as i64, payload)
    }

    /// Unicode object header with an explicit state word.
    pub fn unicode_with_state(&mut self, text: &str, state: u32) -> Address
    {
        let layout = self.layout().ascii;
        let mut buf = vec![0u8; layout.size];
        self.put_ssize(&mut buf, layout.length, text.len() as i64);
        Self::put_u32(&mut buf, layout.state, state);
        buf.extend_from_slice(text.as_bytes());
        buf.push(0);
        self.map(buf)
    }

    pub fn ascii(&mut self, text: &str) -> Address
    {
        self.unicode_with_state(text, ASCII_STATE)
    }

    pub fn code_raw(&mut self, name: Address, filename: Address, first_line: i32, lnotab: Address) -> Address
    {
        let layout = self.layout().code;
        let mut buf = vec![0u8; layout.size];
        self.put_pointer(&mut buf, layout.co_name, name);
        self.put_pointer(&mut buf, layout.co_filename, filename);
        Self::put_i32(&mut buf, layout.co_firstlineno, first_line);
        self.put_pointer(&mut buf, layout.co_lnotab, lnotab);
        self.map(buf)
    }

    /// Code object with ASCII name and filename and the given table.
    pub fn code(&mut self, name: &str, filename: &str, first_line: i32, lnotab: &[u8]) -> Address
    {
        let name = self.ascii(name);
        let filename = self.ascii(filename);
        let lnotab = self.bytes(lnotab);
        self.code_raw(name, filename, first_line, lnotab)
    }

    pub fn frame(&mut self, code: Address, back: Address, last_instruction: i32) -> Address
    {
        let layout = self.layout().frame;
        let mut buf = vec![0u8; layout.size];
        self.put_pointer(&mut buf, layout.f_back, back);
        self.put_pointer(&mut buf, layout.f_code, code);
        Self::put_i32(&mut buf, layout.f_lasti, last_instruction);
        self.map(buf)
    }

    pub fn thread(&mut self, next: Address, frame: Address) -> Address
    {
        let layout = self.layout().thread;
        let mut buf = vec![0u8; layout.size];
        self.put_pointer(&mut buf, layout.next, next);
        self.put_pointer(&mut buf, layout.frame, frame);
        self.map(buf)
    }

    pub fn interpreter(&mut self, next: Address, tstate_head: Address) -> Address
    {
        let layout = self.layout().interpreter;
        let mut buf = vec![0u8; layout.size];
        self.put_pointer(&mut buf, layout.next, next);
        self.put_pointer(&mut buf, layout.tstate_head, tstate_head);
        self.map(buf)
    }

    /// `count` frames sharing one code object, linked outermost to innermost.
    ///
    /// Returns the frame addresses innermost first.
    pub fn frame_chain(&mut self, count: usize) -> Vec<Address>
    {
        let code = self.code("work", "/srv/app/worker.py", 1, &[]);
        let mut frames = Vec::with_capacity(count);
        let mut back = Address::ZERO;
        for _ in 0..count {
            back = self.frame(code, back, 0);
            frames.push(back);
        }
        frames.reverse();
        frames
    }
}

impl RemoteProcess for FakeProcess
{
    fn read(&self, address: Address, buf: &mut [u8]) -> Result<(), RemoteFault>
    {
        self.reads.set(self.reads.get() + 1);
        let start = address.value();
        let (&base, data) = self
            .regions
            .range(..=start)
            .next_back()
            .ok_or(RemoteFault::Unmapped(address))?;
        let offset = (start - base) as usize;
        let end = offset.checked_add(buf.len()).ok_or(RemoteFault::Unmapped(address))?;
        let src = data.get(offset..end).ok_or(RemoteFault::Unreadable {
            address,
            len: buf.len(),
        })?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn lookup_global_symbol_info(&self, object: &str, symbol: &str) -> Result<SymbolInfo, RemoteFault>
    {
        self.symbols
            .get(&(object.to_string(), symbol.to_string()))
            .copied()
            .ok_or_else(|| RemoteFault::NoSymbol {
                object: object.to_string(),
                symbol: symbol.to_string(),
            })
    }

    fn data_model(&self) -> Result<DataModel, RemoteFault>
    {
        self.model_queries.set(self.model_queries.get() + 1);
        match &self.model_fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(self.model),
        }
    }
}
