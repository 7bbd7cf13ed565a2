//! # Agent
//!
//! The facade the host debugger holds for one inspected process.
//!
//! ## Lifecycle
//!
//! 1. Create: [`Agent::create`] checks the protocol version and asks the
//!    process for its data model, which fixes the layout used from then on.
//! 2. Walk: [`Agent::interpreter_iter`], [`Agent::thread_iter`], and
//!    [`Agent::frame_iter`] yield remote addresses.
//! 3. Describe: [`Agent::describe_frame`] turns a frame address into a line
//!    of stack trace.
//! 4. Destroy: drop the agent (or call [`Agent::destroy`]). The process is
//!    never touched.
//!
//! The agent borrows the process handle for its whole life and never
//! modifies the inspected process.

use tracing::debug;

use crate::config::AgentConfig;
use crate::error::{PydbError, PydbResult};
use crate::iter::{IterKind, RemoteIter};
use crate::layout::Layout;
use crate::reader::Reader;
use crate::remote::{RemoteProcess, EXECUTABLE_OBJECT};
use crate::types::{Address, DataModel, SymbolInfo};
use crate::PYDB_VERSION;

/// Introspection agent bound to one inspected process.
pub struct Agent<'p, P: ?Sized>
{
    reader: Reader<'p, P>,
    version: u32,
    config: AgentConfig,
}

impl<'p, P: RemoteProcess + ?Sized> Agent<'p, P>
{
    /// Create an agent with the default [`AgentConfig`].
    ///
    /// ## Errors
    ///
    /// - `UnsupportedVersion`: `version` is not [`PYDB_VERSION`]
    /// - `ModelDetectionFailed`: the process could not report its data model
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use pydb_core::{Agent, PYDB_VERSION};
    ///
    /// let agent = Agent::create(&process, PYDB_VERSION)?;
    /// for interp in agent.interpreter_iter(None)? {
    ///     for thread in agent.thread_iter(interp)? {
    ///         for frame in agent.frame_iter(thread)? {
    ///             print!("{}", agent.describe_frame(frame, false)?);
    ///         }
    ///     }
    /// }
    /// ```
    pub fn create(process: &'p P, version: u32) -> PydbResult<Self>
    {
        Self::with_config(process, version, AgentConfig::default())
    }

    /// Create an agent with an explicit configuration.
    pub fn with_config(process: &'p P, version: u32, config: AgentConfig) -> PydbResult<Self>
    {
        if version != PYDB_VERSION {
            return Err(PydbError::UnsupportedVersion {
                requested: version,
                supported: PYDB_VERSION,
            });
        }

        let model = process.data_model().map_err(PydbError::ModelDetectionFailed)?;
        debug!(%model, runtime = %config.runtime_library, "agent created");

        Ok(Self {
            reader: Reader::new(process, Layout::for_model(model)),
            version,
            config,
        })
    }

    /// Release the agent. Equivalent to dropping it.
    pub fn destroy(self)
    {
        debug!(model = %self.data_model(), "agent destroyed");
    }

    pub fn version(&self) -> u32
    {
        self.version
    }

    pub fn config(&self) -> &AgentConfig
    {
        &self.config
    }

    /// Data model detected at creation.
    pub fn data_model(&self) -> DataModel
    {
        self.reader.model()
    }

    /// Returns `true` if the target uses 64-bit pointers.
    pub fn is_wide(&self) -> bool
    {
        self.data_model().is_wide()
    }

    /// Decoder set for the target's data model.
    pub fn reader(&self) -> Reader<'p, P>
    {
        self.reader
    }

    /// Look `symbol` up in the runtime library, then in the executable.
    pub(crate) fn lookup_symbol_info(&self, symbol: &str) -> PydbResult<SymbolInfo>
    {
        let process = self.reader.process();
        process
            .lookup_global_symbol_info(&self.config.runtime_library, symbol)
            .or_else(|_| process.lookup_global_symbol_info(EXECUTABLE_OBJECT, symbol))
            .map_err(|source| PydbError::SymbolNotFound {
                object: self.config.runtime_library.clone(),
                symbol: symbol.to_string(),
                source,
            })
    }

    fn lookup_symbol(&self, symbol: &str) -> PydbResult<Address>
    {
        let process = self.reader.process();
        process
            .lookup_global_symbol(&self.config.runtime_library, symbol)
            .or_else(|_| process.lookup_global_symbol(EXECUTABLE_OBJECT, symbol))
            .map_err(|source| PydbError::SymbolNotFound {
                object: self.config.runtime_library.clone(),
                symbol: symbol.to_string(),
                source,
            })
    }

    /// Walk the interpreter list.
    ///
    /// `head` is the address of the variable holding the first interpreter
    /// state. When `None` (or null) the configured head symbol is resolved.
    ///
    /// ## Errors
    ///
    /// - `SymbolNotFound`: no `head` given and the head symbol is missing
    /// - `ReadFault`: the head variable could not be read
    pub fn interpreter_iter(&self, head: Option<Address>) -> PydbResult<RemoteIter<'p, P>>
    {
        let head = match head.filter(|head| !head.is_null()) {
            Some(head) => head,
            None => self.lookup_symbol(&self.config.interp_head_symbol)?,
        };
        let first = self.reader.read_pointer(head)?;
        Ok(RemoteIter::new(self.reader, IterKind::Interpreter, first))
    }

    /// Walk the threads of the interpreter state at `interp`.
    ///
    /// ## Errors
    ///
    /// - `ReadFault`: the interpreter state could not be read
    pub fn thread_iter(&self, interp: Address) -> PydbResult<RemoteIter<'p, P>>
    {
        let layout = self.reader.layout().interpreter;
        let record = self.reader.read_record(interp, layout.size)?;
        Ok(RemoteIter::new(self.reader, IterKind::Thread, record.pointer(layout.tstate_head)))
    }

    /// Walk the frames of the thread state at `thread`, innermost first.
    ///
    /// ## Errors
    ///
    /// - `ReadFault`: the thread state could not be read
    pub fn frame_iter(&self, thread: Address) -> PydbResult<RemoteIter<'p, P>>
    {
        let layout = self.reader.layout().thread;
        let record = self.reader.read_record(thread, layout.size)?;
        Ok(RemoteIter::new(self.reader, IterKind::Frame, record.pointer(layout.frame)))
    }
}
